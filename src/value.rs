// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! Dynamically-typed scalar values.

An `Sv` is a reference-counted handle to a `Value`, modeled on the scalars
of the scripting host that the Slurm accounting bindings talk to. Handles are
cheap to clone; the underlying value is released when the last handle goes
away.

*/

use libc::c_void;
use std::borrow::Cow;
use std::fmt;
use std::rc::{Rc, Weak};


/// A raw pointer wrapped as a reference, tagged with a class name.
///
/// The dynamic side can recover both the pointer and the tag that says what
/// kind of native object it points to. The pointer is never dereferenced.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OpaqueRef {
    class: String,
    addr: usize,
}

impl OpaqueRef {
    pub fn new(class: &str, ptr: *mut c_void) -> Self {
        OpaqueRef {
            class: class.to_owned(),
            addr: ptr as usize,
        }
    }

    /// The type tag this reference was created with.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.addr as *mut c_void
    }
}


/// The contents of a dynamic scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value at all.
    Undef,

    /// A signed integer.
    Iv(i64),

    /// An unsigned integer.
    Uv(u64),

    /// A string.
    Pv(String),

    /// One of the two boolean singletons.
    Bool(bool),

    /// An opaque, tagged reference to native memory.
    Ref(OpaqueRef),
}


/// A shared handle to a dynamic scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct Sv(Rc<Value>);

thread_local! {
    static SV_UNDEF: Sv = Sv(Rc::new(Value::Undef));
    static SV_YES: Sv = Sv(Rc::new(Value::Bool(true)));
    static SV_NO: Sv = Sv(Rc::new(Value::Bool(false)));
}

impl Sv {
    fn new(value: Value) -> Self {
        Sv(Rc::new(value))
    }

    /// Get the shared undefined value.
    pub fn undef() -> Self {
        SV_UNDEF.with(Sv::clone)
    }

    /// Get the shared true value.
    pub fn yes() -> Self {
        SV_YES.with(Sv::clone)
    }

    /// Get the shared false value.
    pub fn no() -> Self {
        SV_NO.with(Sv::clone)
    }

    /// Get one of the two boolean singletons. This never allocates.
    pub fn bool(b: bool) -> Self {
        if b {
            Sv::yes()
        } else {
            Sv::no()
        }
    }

    pub fn iv(i: i64) -> Self {
        Sv::new(Value::Iv(i))
    }

    pub fn uv(u: u64) -> Self {
        Sv::new(Value::Uv(u))
    }

    pub fn pv<S: Into<String>>(s: S) -> Self {
        Sv::new(Value::Pv(s.into()))
    }

    pub fn opaque(r: OpaqueRef) -> Self {
        Sv::new(Value::Ref(r))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn is_undef(&self) -> bool {
        match *self.0 {
            Value::Undef => true,
            _ => false,
        }
    }

    /// Whether two handles refer to the very same scalar.
    pub fn ptr_eq(a: &Sv, b: &Sv) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Get a weak handle that does not keep the scalar alive.
    pub fn downgrade(this: &Sv) -> Weak<Value> {
        Rc::downgrade(&this.0)
    }

    /// Extract an unsigned integer the way the host does: negative numbers
    /// wrap, strings are numified.
    pub fn to_uv(&self) -> u64 {
        let n = self.numify();

        if n < 0 {
            clamp_i64(n) as u64
        } else if n > u64::max_value() as i128 {
            u64::max_value()
        } else {
            n as u64
        }
    }

    /// Extract a signed integer. Unsigned values above `i64::MAX` wrap.
    pub fn to_iv(&self) -> i64 {
        let n = self.numify();

        if n > i64::max_value() as i128 {
            if n > u64::max_value() as i128 {
                u64::max_value() as i64
            } else {
                n as u64 as i64
            }
        } else {
            clamp_i64(n)
        }
    }

    /// Truthiness. Undef, zero, the empty string, `"0"`, and false are
    /// false; everything else, including every reference, is true.
    pub fn is_true(&self) -> bool {
        match *self.0 {
            Value::Undef => false,
            Value::Iv(i) => i != 0,
            Value::Uv(u) => u != 0,
            Value::Pv(ref s) => !(s.is_empty() || s == "0"),
            Value::Bool(b) => b,
            Value::Ref(_) => true,
        }
    }

    /// Get the string form of this value, or `None` if it is undefined.
    ///
    /// Strings are borrowed as-is; other values are stringified.
    pub fn to_pv(&self) -> Option<Cow<str>> {
        match *self.0 {
            Value::Undef => None,
            Value::Pv(ref s) => Some(Cow::Borrowed(s.as_str())),
            _ => Some(Cow::Owned(self.to_string())),
        }
    }

    /// Dereference, if this is an opaque reference.
    pub fn as_opaque(&self) -> Option<&OpaqueRef> {
        match *self.0 {
            Value::Ref(ref r) => Some(r),
            _ => None,
        }
    }

    /// Numeric equality, as the host's `==` operator.
    pub fn num_eq(&self, other: i64) -> bool {
        self.numify() == other as i128
    }

    fn numify(&self) -> i128 {
        match *self.0 {
            Value::Undef => 0,
            Value::Iv(i) => i as i128,
            Value::Uv(u) => u as i128,
            Value::Pv(ref s) => numify_str(s),
            Value::Bool(b) => b as i128,
            Value::Ref(ref r) => r.addr as i128,
        }
    }
}

impl PartialEq<i64> for Sv {
    fn eq(&self, other: &i64) -> bool {
        self.num_eq(*other)
    }
}

impl fmt::Display for Sv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            Value::Undef => Ok(()),
            Value::Iv(i) => write!(f, "{}", i),
            Value::Uv(u) => write!(f, "{}", u),
            Value::Pv(ref s) => f.write_str(s),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => Ok(()),
            Value::Ref(ref r) => write!(f, "{}=SCALAR(0x{:x})", r.class, r.addr),
        }
    }
}


fn clamp_i64(n: i128) -> i64 {
    if n < i64::min_value() as i128 {
        i64::min_value()
    } else if n > i64::max_value() as i128 {
        i64::max_value()
    } else {
        n as i64
    }
}

/// Numify a string by its leading decimal number, ignoring leading
/// whitespace. Fractions and exponents are honored and the result truncated
/// toward zero, so `"1e3"` is 1000 and `"3.9"` is 3. Anything that does not
/// start with a number is zero.
fn numify_str(s: &str) -> i128 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_start = match bytes.first() {
        Some(&b'-') | Some(&b'+') => 1,
        _ => 0,
    };
    let int_end = digits_from(int_start);
    let mut end = int_end;
    let mut integral = true;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 || int_end > int_start {
            end = frac_end;
            integral = false;
        }
    }

    if end == int_start {
        return 0;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let exp_start = match bytes.get(end + 1) {
            Some(&b'-') | Some(&b'+') => end + 2,
            _ => end + 1,
        };
        let exp_end = digits_from(exp_start);
        if exp_end > exp_start {
            end = exp_end;
            integral = false;
        }
    }

    // Saturate just outside the 64-bit range; callers clamp.
    let limit = u64::max_value() as i128 + 1;

    if integral {
        let mut n: i128 = 0;

        for &b in &bytes[int_start..int_end] {
            n = match n.checked_mul(10).and_then(|n| n.checked_add((b - b'0') as i128)) {
                Some(n) if n <= limit => n,
                _ => limit,
            };
        }

        return if bytes[0] == b'-' { -n } else { n };
    }

    match s[..end].parse::<f64>() {
        Ok(f) if f >= limit as f64 => limit,
        Ok(f) if f <= -(limit as f64) => -limit,
        Ok(f) => f.trunc() as i128,
        Err(_) => 0,
    }
}
