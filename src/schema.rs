// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Declarative field tables for whole records.

A `Schema` lists the fields of a native record in declaration order, each
with its key and whether it is required. Converting a record walks the
table and stops at the first field that fails, so the caller never sees a
record that is silently missing data.

Build tables with the `field!` macro:

```rust
#[macro_use] extern crate slurmdb_hv;

use slurmdb_hv::{Hv, Marshaler, Schema};

#[derive(Debug, Default)]
struct Accounting {
    alloc_secs: u64,
    cpu_count: u32,
}

fn main() {
    let schema = Schema::new("accounting")
        .field(field!(Accounting, alloc_secs: u64, required))
        .field(field!(Accounting, cpu_count: u32));

    let m = Marshaler::default();
    let mut hv = Hv::new();
    let rec = Accounting { alloc_secs: 3600, cpu_count: 96 };
    schema.store(&m, &rec, &mut hv).unwrap();

    let back = schema.fetch(&m, &hv, Accounting::default()).unwrap();
    assert_eq!(back.cpu_count, 96);
}
```

*/

use container::HashStore;
use failure::{Error, ResultExt};
use field::{FromSv, NativeField};
use marshal::Marshaler;
use std::fmt;
use MarshalError;


type StoreFn<R> = Box<dyn Fn(&Marshaler, &mut dyn HashStore, &R) -> Result<(), MarshalError>>;
type FetchFn<R> = Box<dyn Fn(&Marshaler, &dyn HashStore, &mut R) -> Result<bool, MarshalError>>;


/// One named field of a record type `R`.
pub struct Field<R> {
    name: &'static str,
    required: bool,
    store: StoreFn<R>,
    fetch: FetchFn<R>,
}

impl<R: 'static> Field<R> {
    /// Describe a field stored under `name`, reached through the two
    /// accessors. The `field!` macro writes these for you.
    pub fn new<T>(name: &'static str, required: bool, get: fn(&R) -> &T, get_mut: fn(&mut R) -> &mut T) -> Self
        where T: NativeField + for<'a> FromSv<'a> + 'static
    {
        Field {
            name,
            required,
            store: Box::new(move |m: &Marshaler, hv: &mut dyn HashStore, rec: &R| {
                m.store(hv, name, get(rec))
            }),
            fetch: Box::new(move |m: &Marshaler, hv: &dyn HashStore, rec: &mut R| {
                m.fetch_into(hv, name, required, get_mut(rec))
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("required", &self.required)
            .finish()
    }
}


/// The ordered field table of a record type `R`.
#[derive(Debug)]
pub struct Schema<R> {
    record: &'static str,
    fields: Vec<Field<R>>,
}

impl<R> Schema<R> {
    /// Start an empty table for the record type called `record`, a name
    /// used only in diagnostics.
    pub fn new(record: &'static str) -> Self {
        Schema {
            record,
            fields: Vec::new(),
        }
    }

    /// Append a field to the table.
    pub fn field(mut self, field: Field<R>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn record_name(&self) -> &'static str {
        self.record
    }

    pub fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    /// Write every field of `rec` into `hv`, in declaration order.
    ///
    /// Fields already written before a failure stay in `hv`.
    pub fn store<H: HashStore>(&self, m: &Marshaler, rec: &R, hv: &mut H) -> Result<(), Error> {
        for field in &self.fields {
            (field.store)(m, &mut *hv, rec)
                .with_context(|_| format!("could not convert {} record to a hash", self.record))?;
        }

        Ok(())
    }

    /// Fill in `base` from `hv`, in declaration order.
    ///
    /// `base` supplies the values of optional fields missing from the hash.
    /// The record is only handed back if every field converted.
    pub fn fetch<H: HashStore>(&self, m: &Marshaler, hv: &H, mut base: R) -> Result<R, Error> {
        for field in &self.fields {
            (field.fetch)(m, hv, &mut base)
                .with_context(|_| format!("could not convert hash to {} record", self.record))?;
        }

        Ok(base)
    }
}


/// A native record type with a field table.
pub trait Record: Sized + 'static {
    fn schema() -> Schema<Self>;

    /// Write this record into `hv`.
    fn to_hash<H: HashStore>(&self, m: &Marshaler, hv: &mut H) -> Result<(), Error> {
        Self::schema().store(m, self, hv)
    }

    /// Build a record from `hv`, starting from the default record.
    fn from_hash<H: HashStore>(m: &Marshaler, hv: &H) -> Result<Self, Error>
        where Self: Default
    {
        Self::schema().fetch(m, hv, Self::default())
    }
}
