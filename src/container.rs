// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Dynamic containers: keyed hashes and indexed arrays of scalars.

The marshaler only needs to insert and look up values, so that is all the
`HashStore` and `ArrayStore` traits ask for. A rejected insert hands the
value back to the caller, who is then responsible for releasing it.

*/

use itertools::Itertools;
use std::collections::hash_map::{self, HashMap};
use std::fmt;
use value::Sv;


/// A container of scalars keyed by exact string match.
pub trait HashStore {
    /// Install `value` at `key`, replacing any previous entry. If the
    /// container cannot take the value, it is returned unchanged.
    fn store(&mut self, key: &str, value: Sv) -> Result<(), Sv>;

    /// Look up the value stored at `key`.
    fn fetch(&self, key: &str) -> Option<&Sv>;
}


/// A container of scalars keyed by position.
pub trait ArrayStore {
    /// Install `value` at `index`, growing the array if needed. If the
    /// container cannot take the value, it is returned unchanged.
    fn store(&mut self, index: usize, value: Sv) -> Result<(), Sv>;

    /// Look up the value stored at `index`. Holes and out-of-range indices
    /// give `None`.
    fn fetch(&self, index: usize) -> Option<&Sv>;
}


/// An in-memory hash of scalars.
#[derive(Clone, Debug, Default)]
pub struct Hv {
    entries: HashMap<String, Sv>,
    limit: Option<usize>,
}

impl Hv {
    pub fn new() -> Self {
        Hv::default()
    }

    /// Create a hash that refuses to hold more than `limit` distinct keys.
    /// Replacing the value of an existing key always succeeds.
    pub fn with_limit(limit: usize) -> Self {
        Hv {
            entries: HashMap::new(),
            limit: Some(limit),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The keys of this hash, in arbitrary order.
    pub fn keys(&self) -> hash_map::Keys<String, Sv> {
        self.entries.keys()
    }

    pub fn iter(&self) -> hash_map::Iter<String, Sv> {
        self.entries.iter()
    }

    pub fn remove(&mut self, key: &str) -> Option<Sv> {
        self.entries.remove(key)
    }
}

impl HashStore for Hv {
    fn store(&mut self, key: &str, value: Sv) -> Result<(), Sv> {
        if let Some(limit) = self.limit {
            if self.entries.len() >= limit && !self.entries.contains_key(key) {
                return Err(value);
            }
        }

        self.entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn fetch(&self, key: &str) -> Option<&Sv> {
        self.entries.get(key)
    }
}

impl fmt::Display for Hv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let body = self.entries
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| format!("{} => {}", k, v))
            .join(", ");
        write!(f, "{{{}}}", body)
    }
}


/// An in-memory array of scalars, possibly with holes.
#[derive(Clone, Debug, Default)]
pub struct Av {
    items: Vec<Option<Sv>>,
    limit: Option<usize>,
}

impl Av {
    pub fn new() -> Self {
        Av::default()
    }

    /// Create an array that refuses to grow beyond `limit` slots.
    pub fn with_limit(limit: usize) -> Self {
        Av {
            items: Vec::new(),
            limit: Some(limit),
        }
    }

    /// The number of slots, including holes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Sv>> {
        self.items.iter().map(Option::as_ref)
    }
}

impl ArrayStore for Av {
    fn store(&mut self, index: usize, value: Sv) -> Result<(), Sv> {
        if let Some(limit) = self.limit {
            if index >= limit {
                return Err(value);
            }
        }

        if index >= self.items.len() {
            let new_len = match index.checked_add(1) {
                Some(n) => n,
                None => return Err(value),
            };

            if self.items.try_reserve(new_len - self.items.len()).is_err() {
                return Err(value);
            }

            self.items.resize(new_len, None);
        }

        self.items[index] = Some(value);
        Ok(())
    }

    fn fetch(&self, index: usize) -> Option<&Sv> {
        self.items.get(index).and_then(Option::as_ref)
    }
}

impl fmt::Display for Av {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let body = self.items
            .iter()
            .map(|item| match *item {
                Some(ref sv) => sv.to_string(),
                None => String::new(),
            })
            .join(", ");
        write!(f, "[{}]", body)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_lookup_is_exact() {
        let mut hv = Hv::new();
        hv.store("name", Sv::pv("tiger")).unwrap();
        assert!(hv.fetch("name").is_some());
        assert!(hv.fetch("Name").is_none());
        assert!(hv.fetch("name ").is_none());
    }

    #[test]
    fn hash_limit_allows_replacement() {
        let mut hv = Hv::with_limit(1);
        hv.store("a", Sv::iv(1)).unwrap();
        hv.store("a", Sv::iv(2)).unwrap();
        let rejected = hv.store("b", Sv::iv(3)).unwrap_err();
        assert_eq!(rejected, 3i64);
        assert_eq!(hv.len(), 1);
        assert_eq!(*hv.fetch("a").unwrap(), 2i64);
    }

    #[test]
    fn hash_display_is_sorted() {
        let mut hv = Hv::new();
        hv.store("rpc_version", Sv::uv(8448)).unwrap();
        hv.store("name", Sv::pv("tiger")).unwrap();
        hv.store("nodes", Sv::undef()).unwrap();
        assert_eq!(hv.to_string(), "{name => tiger, nodes => , rpc_version => 8448}");
    }

    #[test]
    fn array_grows_with_holes() {
        let mut av = Av::new();
        av.store(2, Sv::iv(5)).unwrap();
        assert_eq!(av.len(), 3);
        assert!(av.fetch(0).is_none());
        assert_eq!(*av.fetch(2).unwrap(), 5i64);
        assert!(av.fetch(9).is_none());
        assert_eq!(av.to_string(), "[, , 5]");
    }

    #[test]
    fn array_limit_rejects() {
        let mut av = Av::with_limit(2);
        av.store(1, Sv::iv(1)).unwrap();
        assert!(av.store(2, Sv::iv(2)).is_err());
        assert_eq!(av.iter().filter(Option::is_some).count(), 1);
    }

    #[test]
    fn array_rejects_unallocatable_index() {
        let mut av = Av::new();
        assert!(av.store(usize::max_value(), Sv::iv(1)).is_err());
        assert!(av.store(usize::max_value() >> 2, Sv::iv(1)).is_err());
        assert!(av.is_empty());
    }

    #[test]
    fn hash_keys_iter_and_remove() {
        let mut hv = Hv::new();
        hv.store("name", Sv::pv("tiger")).unwrap();
        hv.store("nodes", Sv::pv("tg[001-100]")).unwrap();

        let keys: Vec<&String> = hv.keys().sorted().collect();
        assert_eq!(keys, ["name", "nodes"]);
        assert_eq!(hv.iter().filter(|&(_, v)| v.to_string() == "tiger").count(), 1);

        assert_eq!(hv.remove("name").map(|sv| sv.to_string()), Some("tiger".to_owned()));
        assert!(hv.remove("name").is_none());
        assert_eq!(hv.len(), 1);
    }
}
