// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

/*! The out-of-band sentinel values used throughout the Slurm API.

Slurm marks "unbounded" and "unset" numeric fields with two magic constants,
`INFINITE` and `NO_VAL`. Narrower fields hold the constants truncated to
their own width, so a `u16` field that is unset contains `0xfffe` rather than
`0xfffffffe`. When such a value crosses into a dynamic container it has to
become the canonical constant again, otherwise the dynamic side would see an
ordinary large count.

*/

use value::{Sv, Value};


/// The 32-bit Slurm constant meaning "unbounded".
pub const INFINITE: u32 = 0xffff_ffff;

/// The 32-bit Slurm constant meaning "no value set".
pub const NO_VAL: u32 = 0xffff_fffe;


/// Which of the two sentinels a value denotes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sentinel {
    /// The field is unbounded.
    Infinite,

    /// The field is unset.
    NoVal,
}


/// The pair of sentinel constants a marshaler recognizes.
///
/// The constants are expected to be chosen so that truncating the canonical
/// forms to any supported width gives that width's own sentinel pattern.
/// Nothing here checks that; reads rely on it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sentinels {
    infinite: u64,
    no_val: u64,
}

impl Sentinels {
    /// The constants defined by `slurm.h`.
    pub const SLURM: Sentinels = Sentinels {
        infinite: INFINITE as u64,
        no_val: NO_VAL as u64,
    };

    pub fn new(infinite: u64, no_val: u64) -> Self {
        Sentinels { infinite, no_val }
    }

    /// The canonical "unbounded" value as stored in a dynamic container.
    pub fn infinite(&self) -> i64 {
        self.infinite as i64
    }

    /// The canonical "unset" value as stored in a dynamic container.
    pub fn no_val(&self) -> i64 {
        self.no_val as i64
    }

    /// Get the bit pattern a field of width `bits` uses for `which`.
    pub fn truncated(&self, which: Sentinel, bits: u32) -> u64 {
        let raw = match which {
            Sentinel::Infinite => self.infinite,
            Sentinel::NoVal => self.no_val,
        };

        raw & width_mask(bits)
    }

    /// Figure out whether `raw`, the contents of a field `bits` wide, holds
    /// one of the sentinels. `INFINITE` wins if both truncate to the same
    /// pattern.
    pub fn classify(&self, raw: u64, bits: u32) -> Option<Sentinel> {
        let raw = raw & width_mask(bits);

        if raw == self.truncated(Sentinel::Infinite, bits) {
            Some(Sentinel::Infinite)
        } else if raw == self.truncated(Sentinel::NoVal, bits) {
            Some(Sentinel::NoVal)
        } else {
            None
        }
    }

    /// If `raw` is a sentinel at width `bits`, get the canonical signed
    /// value that should represent it in a dynamic container.
    pub fn canonical(&self, raw: u64, bits: u32) -> Option<i64> {
        self.classify(raw, bits).map(|which| match which {
            Sentinel::Infinite => self.infinite(),
            Sentinel::NoVal => self.no_val(),
        })
    }

    /// Recognize a canonical sentinel on the dynamic side of the boundary.
    pub fn classify_sv(&self, sv: &Sv) -> Option<Sentinel> {
        match *sv.value() {
            Value::Undef | Value::Ref(_) => None,
            _ => {
                if sv.num_eq(self.infinite()) {
                    Some(Sentinel::Infinite)
                } else if sv.num_eq(self.no_val()) {
                    Some(Sentinel::NoVal)
                } else {
                    None
                }
            }
        }
    }
}

impl Default for Sentinels {
    fn default() -> Self {
        Sentinels::SLURM
    }
}


fn width_mask(bits: u32) -> u64 {
    if bits >= 64 {
        !0
    } else {
        (1u64 << bits) - 1
    }
}
