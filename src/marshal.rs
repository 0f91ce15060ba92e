// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Moving single fields between native records and dynamic containers.

Hash entries store ordinary unsigned values unsigned, while array elements
store them signed. Either way a sentinel is stored as its canonical signed
constant, and reads narrow by plain truncation.

*/

use container::{ArrayStore, HashStore};
use field::{Encoder, FromSv, IntStorage, NativeField};
use sentinel::Sentinels;
use value::Sv;
use MarshalError;


/// Converts fields one at a time, recognizing a configured set of sentinels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Marshaler {
    sentinels: Sentinels,
}

impl Marshaler {
    pub fn new(sentinels: Sentinels) -> Self {
        Marshaler { sentinels }
    }

    pub fn sentinels(&self) -> Sentinels {
        self.sentinels
    }

    /// Write `value` into `hv` at `key`.
    ///
    /// Sentinels are stored as their canonical signed constants whatever the
    /// width of the native field; other unsigned values are stored
    /// unsigned. If the hash rejects the value it is dropped before this
    /// function returns.
    pub fn store<H, T>(&self, hv: &mut H, key: &str, value: &T) -> Result<(), MarshalError>
        where H: HashStore + ?Sized, T: NativeField + ?Sized
    {
        if key.is_empty() {
            warn!("refusing to store a field with an empty key");
            return Err(MarshalError::InvalidKey);
        }

        let sv = value.encode(&Encoder::new(Some(key), self.sentinels, IntStorage::Unsigned));
        self.install(hv, key, sv)
    }

    /// Write an already-constructed scalar into `hv` at `key`.
    pub fn store_sv<H>(&self, hv: &mut H, key: &str, sv: Sv) -> Result<(), MarshalError>
        where H: HashStore + ?Sized
    {
        if key.is_empty() {
            warn!("refusing to store a field with an empty key");
            return Err(MarshalError::InvalidKey);
        }

        self.install(hv, key, sv)
    }

    /// Write `value` into `av` at `index`.
    ///
    /// Array elements use signed storage for ordinary unsigned values, and
    /// opaque pointers carry an empty type tag since there is no key.
    pub fn store_at<A, T>(&self, av: &mut A, index: usize, value: &T) -> Result<(), MarshalError>
        where A: ArrayStore + ?Sized, T: NativeField + ?Sized
    {
        let sv = value.encode(&Encoder::new(None, self.sentinels, IntStorage::Signed));

        if let Err(rejected) = av.store(index, sv) {
            drop(rejected);
            warn!("failed to store element [{}]", index);
            return Err(MarshalError::InsertionFailure(format!("[{}]", index)));
        }

        Ok(())
    }

    /// Read the field `key` out of `hv`.
    ///
    /// If the key is absent, a required field is an error, while an optional
    /// one gives `Ok(None)`. String kinds may borrow from the hash entry.
    pub fn fetch<'a, H, T>(&self, hv: &'a H, key: &str, required: bool) -> Result<Option<T>, MarshalError>
        where H: HashStore + ?Sized, T: FromSv<'a>
    {
        match hv.fetch(key) {
            Some(sv) => Ok(Some(T::from_sv(sv))),

            None if required => {
                warn!("required field \"{}\" missing in hash", key);
                Err(MarshalError::MissingRequiredField(key.to_owned()))
            },

            None => {
                trace!("optional field \"{}\" not present", key);
                Ok(None)
            },
        }
    }

    /// Read the field `key` out of `hv` into `target`.
    ///
    /// Returns whether the field was present. An absent optional field leaves
    /// `target` holding whatever the caller put there.
    pub fn fetch_into<H, T>(&self, hv: &H, key: &str, required: bool, target: &mut T) -> Result<bool, MarshalError>
        where H: HashStore + ?Sized, T: for<'a> FromSv<'a>
    {
        match self.fetch::<H, T>(hv, key, required)? {
            Some(value) => {
                *target = value;
                Ok(true)
            },

            None => Ok(false),
        }
    }

    /// Read the element at `index` out of `av`, if there is one.
    pub fn fetch_at<'a, A, T>(&self, av: &'a A, index: usize) -> Option<T>
        where A: ArrayStore + ?Sized, T: FromSv<'a>
    {
        av.fetch(index).map(T::from_sv)
    }

    fn install<H>(&self, hv: &mut H, key: &str, sv: Sv) -> Result<(), MarshalError>
        where H: HashStore + ?Sized
    {
        if let Err(rejected) = hv.store(key, sv) {
            drop(rejected);
            warn!("failed to store field \"{}\"", key);
            return Err(MarshalError::InsertionFailure(key.to_owned()));
        }

        Ok(())
    }
}
