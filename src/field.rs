// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Per-kind conversion rules between native fields and dynamic scalars.

`NativeField` says how a native value becomes an `Sv`; `FromSv` says how an
`Sv` is reinterpreted as a native value. Reads do no sentinel handling of
their own: narrowing a canonical sentinel by truncation already gives the
width's own sentinel pattern.

*/

use chrono::{DateTime, Utc};
use libc::{self, c_void};
use sentinel::Sentinels;
use std::borrow::Cow;
use std::ptr;
use value::{OpaqueRef, Sv};


/// How unsigned values that are not sentinels get tagged.
///
/// Both forms hold the same magnitude; they differ in how the host formats
/// and compares the value. Sentinels are always stored signed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum IntStorage {
    /// Store as a signed integer. Used for array elements.
    Signed,

    /// Store as an unsigned integer. Used for hash entries.
    Unsigned,
}


/// The context in which a native value is being encoded.
#[derive(Clone, Copy, Debug)]
pub struct Encoder<'k> {
    key: Option<&'k str>,
    sentinels: Sentinels,
    ints: IntStorage,
}

impl<'k> Encoder<'k> {
    pub fn new(key: Option<&'k str>, sentinels: Sentinels, ints: IntStorage) -> Self {
        Encoder { key, sentinels, ints }
    }

    /// The key the value will be stored under, if it is going into a hash.
    pub fn key(&self) -> Option<&'k str> {
        self.key
    }

    pub fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }

    pub fn int_storage(&self) -> IntStorage {
        self.ints
    }

    /// Encode the contents of an unsigned field `bits` wide.
    pub fn unsigned(&self, raw: u64, bits: u32) -> Sv {
        if let Some(canonical) = self.sentinels.canonical(raw, bits) {
            return Sv::iv(canonical);
        }

        match self.ints {
            IntStorage::Unsigned => Sv::uv(raw),
            IntStorage::Signed if raw <= i64::max_value() as u64 => Sv::iv(raw as i64),
            IntStorage::Signed => Sv::uv(raw),
        }
    }
}


/// A native value that can be written into a dynamic container.
pub trait NativeField {
    fn encode(&self, enc: &Encoder) -> Sv;
}

/// A native value that can be read out of a dynamic scalar.
///
/// The lifetime lets string kinds borrow from the container entry instead
/// of copying.
pub trait FromSv<'a>: Sized {
    fn from_sv(sv: &'a Sv) -> Self;
}


macro_rules! unsigned_fields {
    ($($t:ty),*) => {$(
        impl NativeField for $t {
            fn encode(&self, enc: &Encoder) -> Sv {
                enc.unsigned(*self as u64, <$t>::BITS)
            }
        }

        impl<'a> FromSv<'a> for $t {
            fn from_sv(sv: &'a Sv) -> Self {
                sv.to_uv() as $t
            }
        }
    )*}
}

unsigned_fields!(u8, u16, u32, u64);


macro_rules! signed_fields {
    ($($t:ty),*) => {$(
        impl NativeField for $t {
            fn encode(&self, _enc: &Encoder) -> Sv {
                Sv::iv(*self as i64)
            }
        }

        impl<'a> FromSv<'a> for $t {
            fn from_sv(sv: &'a Sv) -> Self {
                sv.to_iv() as $t
            }
        }
    )*}
}

signed_fields!(i32, i64);


impl NativeField for bool {
    fn encode(&self, _enc: &Encoder) -> Sv {
        Sv::bool(*self)
    }
}

impl<'a> FromSv<'a> for bool {
    fn from_sv(sv: &'a Sv) -> Self {
        sv.is_true()
    }
}


impl NativeField for str {
    fn encode(&self, _enc: &Encoder) -> Sv {
        Sv::pv(self)
    }
}

impl NativeField for String {
    fn encode(&self, _enc: &Encoder) -> Sv {
        Sv::pv(self.as_str())
    }
}

/// A nullable C string. `None` is stored as undef, which is not the same
/// thing as an empty string.
impl NativeField for Option<String> {
    fn encode(&self, _enc: &Encoder) -> Sv {
        match *self {
            Some(ref s) => Sv::pv(s.as_str()),
            None => Sv::undef(),
        }
    }
}

impl<'s> NativeField for Option<&'s str> {
    fn encode(&self, _enc: &Encoder) -> Sv {
        match *self {
            Some(s) => Sv::pv(s),
            None => Sv::undef(),
        }
    }
}

impl<'a> FromSv<'a> for Option<Cow<'a, str>> {
    fn from_sv(sv: &'a Sv) -> Self {
        sv.to_pv()
    }
}

impl<'a> FromSv<'a> for Option<String> {
    fn from_sv(sv: &'a Sv) -> Self {
        sv.to_pv().map(Cow::into_owned)
    }
}


/// Timestamps travel as unsigned seconds since the epoch, like `time_t`.
impl NativeField for DateTime<Utc> {
    fn encode(&self, _enc: &Encoder) -> Sv {
        Sv::uv(self.timestamp() as libc::time_t as u64)
    }
}

impl<'a> FromSv<'a> for DateTime<Utc> {
    fn from_sv(sv: &'a Sv) -> Self {
        let secs = sv.to_uv() as libc::time_t;
        DateTime::<Utc>::from_timestamp(secs as i64, 0).unwrap_or_default()
    }
}


/// Opaque pointers are wrapped as references tagged with the key they are
/// stored under. A null pointer is stored as undef.
impl NativeField for *mut c_void {
    fn encode(&self, enc: &Encoder) -> Sv {
        if self.is_null() {
            Sv::undef()
        } else {
            Sv::opaque(OpaqueRef::new(enc.key().unwrap_or(""), *self))
        }
    }
}

impl<'a> FromSv<'a> for *mut c_void {
    fn from_sv(sv: &'a Sv) -> Self {
        match sv.as_opaque() {
            Some(r) => r.as_ptr(),
            None => ptr::null_mut(),
        }
    }
}

impl<'a> FromSv<'a> for Option<&'a OpaqueRef> {
    fn from_sv(sv: &'a Sv) -> Self {
        sv.as_opaque()
    }
}


/// An existing scalar is stored as-is, without copying.
impl NativeField for Sv {
    fn encode(&self, _enc: &Encoder) -> Sv {
        self.clone()
    }
}

impl<'a> FromSv<'a> for Sv {
    fn from_sv(sv: &'a Sv) -> Self {
        sv.clone()
    }
}


impl<'r, T: NativeField + ?Sized> NativeField for &'r T {
    fn encode(&self, enc: &Encoder) -> Sv {
        (**self).encode(enc)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sentinel::{INFINITE, NO_VAL};
    use value::Value;

    fn hash_enc() -> Encoder<'static> {
        Encoder::new(Some("field"), Sentinels::SLURM, IntStorage::Unsigned)
    }

    fn array_enc() -> Encoder<'static> {
        Encoder::new(None, Sentinels::SLURM, IntStorage::Signed)
    }

    #[test]
    fn narrow_sentinels_widen_to_canonical() {
        let enc = hash_enc();
        assert_eq!(*0xffffu16.encode(&enc).value(), Value::Iv(INFINITE as i64));
        assert_eq!(*0xfffeu16.encode(&enc).value(), Value::Iv(NO_VAL as i64));
        assert_eq!(*0xffu8.encode(&enc).value(), Value::Iv(INFINITE as i64));
        assert_eq!(*0xfeu8.encode(&enc).value(), Value::Iv(NO_VAL as i64));
        assert_eq!(*INFINITE.encode(&enc).value(), Value::Iv(INFINITE as i64));
        assert_eq!(*(NO_VAL as u64).encode(&enc).value(), Value::Iv(NO_VAL as i64));
    }

    #[test]
    fn plain_values_follow_storage_convention() {
        assert_eq!(*12u16.encode(&hash_enc()).value(), Value::Uv(12));
        assert_eq!(*12u16.encode(&array_enc()).value(), Value::Iv(12));
        assert_eq!(*u64::max_value().encode(&array_enc()).value(), Value::Uv(u64::max_value()));
        assert_eq!(*(-4i32).encode(&hash_enc()).value(), Value::Iv(-4));
    }

    #[test]
    fn signed_int_has_no_sentinel_handling() {
        assert_eq!(*(-1i32).encode(&hash_enc()).value(), Value::Iv(-1));
        assert_eq!(*(0xffffi32).encode(&hash_enc()).value(), Value::Iv(0xffff));
    }

    #[test]
    fn canonical_sentinel_truncates_back() {
        let sv = Sv::iv(INFINITE as i64);
        assert_eq!(u8::from_sv(&sv), 0xff);
        assert_eq!(u16::from_sv(&sv), 0xffff);
        assert_eq!(u32::from_sv(&sv), INFINITE);
        assert_eq!(u64::from_sv(&sv), INFINITE as u64);
    }

    #[test]
    fn strings() {
        let none: Option<String> = None;
        assert!(none.encode(&hash_enc()).is_undef());
        assert_eq!(*Some("").encode(&hash_enc()).value(), Value::Pv(String::new()));
        assert_eq!(<Option<String>>::from_sv(&Sv::undef()), None);
        assert_eq!(<Option<String>>::from_sv(&Sv::pv("")), Some(String::new()));
        assert_eq!(<Option<String>>::from_sv(&Sv::uv(3)), Some("3".to_owned()));
    }

    #[test]
    fn timestamps() {
        let t = Utc.timestamp_opt(1_530_000_000, 0).unwrap();
        let sv = t.encode(&hash_enc());
        assert_eq!(*sv.value(), Value::Uv(1_530_000_000));
        assert_eq!(<DateTime<Utc>>::from_sv(&sv), t);
        assert_eq!(<DateTime<Utc>>::from_sv(&Sv::undef()).timestamp(), 0);
    }

    #[test]
    fn pointers() {
        let p = 0xdead0 as *mut c_void;
        let sv = p.encode(&hash_enc());
        assert_eq!(sv.as_opaque().map(OpaqueRef::class), Some("field"));
        assert_eq!(<*mut c_void>::from_sv(&sv), p);
        assert!(ptr::null_mut::<c_void>().encode(&hash_enc()).is_undef());
        assert!(<*mut c_void>::from_sv(&Sv::iv(0xdead0)).is_null());
        assert_eq!(p.encode(&array_enc()).as_opaque().map(OpaqueRef::class), Some(""));
    }

    #[test]
    fn existing_scalars_are_not_copied() {
        let sv = Sv::pv("shared");
        assert!(Sv::ptr_eq(&sv.encode(&hash_enc()), &sv));
    }

    #[test]
    fn encoder_reports_its_context() {
        let enc = hash_enc();
        assert_eq!(enc.key(), Some("field"));
        assert_eq!(*enc.sentinels(), Sentinels::SLURM);
        assert_eq!(enc.int_storage(), IntStorage::Unsigned);
        assert_eq!(array_enc().key(), None);
        assert_eq!(array_enc().int_storage(), IntStorage::Signed);
    }
}
