// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Marshal Slurm accounting records to and from dynamic hash values.

The `libslurmdb` records that scripting bindings expose are plain C structs.
Their numeric fields use two magic constants, `INFINITE` and `NO_VAL`, to
mean "unbounded" and "unset", truncated to whatever width the field has. This
crate moves fields between such records and dynamically-typed containers
while keeping those sentinels recognizable on the dynamic side.

The pieces are:

- `Sentinels`, the constants to recognize;
- `Sv`, `Hv` and `Av`, a model of the host's dynamic scalars, hashes and
  arrays (any container implementing `HashStore` or `ArrayStore` works);
- `Marshaler`, which converts one field in either direction;
- `Schema` and the `field!` macro, which drive a `Marshaler` over a whole
  record.

*/

extern crate chrono;
extern crate failure;
#[macro_use] extern crate failure_derive;
extern crate itertools;
extern crate libc;
#[macro_use] extern crate log;


/// Describe one field of a record for a `Schema`.
///
/// `field!(Rec, name: Type)` declares an optional field stored under the key
/// `"name"`; append `, required` to make it mandatory when reading.
#[macro_export]
macro_rules! field {
    ($rec:ty, $field:ident : $ty:ty, required) => {{
        fn get(r: &$rec) -> &$ty { &r.$field }
        fn get_mut(r: &mut $rec) -> &mut $ty { &mut r.$field }
        $crate::Field::<$rec>::new::<$ty>(stringify!($field), true, get, get_mut)
    }};

    ($rec:ty, $field:ident : $ty:ty) => {{
        fn get(r: &$rec) -> &$ty { &r.$field }
        fn get_mut(r: &mut $rec) -> &mut $ty { &mut r.$field }
        $crate::Field::<$rec>::new::<$ty>(stringify!($field), false, get, get_mut)
    }};
}


pub mod container;
pub mod field;
pub mod marshal;
pub mod schema;
pub mod sentinel;
pub mod value;

pub use container::{ArrayStore, Av, HashStore, Hv};
pub use field::{Encoder, FromSv, IntStorage, NativeField};
pub use marshal::Marshaler;
pub use schema::{Field, Record, Schema};
pub use sentinel::{Sentinel, Sentinels, INFINITE, NO_VAL};
pub use value::{OpaqueRef, Sv, Value};


/// Ways that moving a field across the boundary can fail.
///
/// Each error names the field responsible. The caller should stop
/// converting the enclosing record once one is returned.
#[derive(Clone, Debug, Eq, Fail, PartialEq)]
pub enum MarshalError {
    /// A required field was not present in the container.
    #[fail(display = "required field \"{}\" missing in hash", _0)]
    MissingRequiredField(String),

    /// The container refused to take the value.
    #[fail(display = "failed to store field \"{}\"", _0)]
    InsertionFailure(String),

    /// A value was to be stored under an empty key.
    #[fail(display = "cannot store a field under an empty key")]
    InvalidKey,
}
