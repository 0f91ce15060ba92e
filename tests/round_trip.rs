// Copyright 2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the MIT License

//! Values written by the marshaler read back unchanged.

#[macro_use] extern crate proptest;
extern crate slurmdb_hv;

use proptest::prelude::*;
use slurmdb_hv::{Av, HashStore, Hv, Marshaler, Sentinels, INFINITE, NO_VAL};


/// Unsigned values, biased toward the edges and the sentinel patterns.
fn interesting_u64() -> BoxedStrategy<u64> {
    prop_oneof![
        Just(0u64),
        Just(u64::max_value()),
        Just(INFINITE as u64),
        Just(NO_VAL as u64),
        Just(0xffffu64),
        Just(0xfffeu64),
        Just(0xffu64),
        Just(0xfeu64),
        any::<u64>(),
    ].boxed()
}

proptest! {
    #[test]
    fn unsigned_fields_round_trip(raw in interesting_u64()) {
        let m = Marshaler::default();
        let mut hv = Hv::new();
        m.store(&mut hv, "u8", &(raw as u8)).unwrap();
        m.store(&mut hv, "u16", &(raw as u16)).unwrap();
        m.store(&mut hv, "u32", &(raw as u32)).unwrap();
        m.store(&mut hv, "u64", &raw).unwrap();

        prop_assert_eq!(m.fetch::<_, u8>(&hv, "u8", true).unwrap(), Some(raw as u8));
        prop_assert_eq!(m.fetch::<_, u16>(&hv, "u16", true).unwrap(), Some(raw as u16));
        prop_assert_eq!(m.fetch::<_, u32>(&hv, "u32", true).unwrap(), Some(raw as u32));
        prop_assert_eq!(m.fetch::<_, u64>(&hv, "u64", true).unwrap(), Some(raw));
    }

    #[test]
    fn array_elements_round_trip(raw in interesting_u64(), signed in any::<i32>()) {
        let m = Marshaler::default();
        let mut av = Av::new();
        m.store_at(&mut av, 0, &(raw as u16)).unwrap();
        m.store_at(&mut av, 1, &(raw as u32)).unwrap();
        m.store_at(&mut av, 2, &signed).unwrap();

        prop_assert_eq!(m.fetch_at::<_, u16>(&av, 0), Some(raw as u16));
        prop_assert_eq!(m.fetch_at::<_, u32>(&av, 1), Some(raw as u32));
        prop_assert_eq!(m.fetch_at::<_, i32>(&av, 2), Some(signed));
    }

    #[test]
    fn stored_sentinels_are_canonical(raw in interesting_u64()) {
        let m = Marshaler::default();
        let s = Sentinels::SLURM;
        let mut hv = Hv::new();
        m.store(&mut hv, "v", &(raw as u16)).unwrap();
        let sv = hv.fetch("v").unwrap();

        match s.classify(raw, 16) {
            Some(which) => prop_assert_eq!(s.classify_sv(sv), Some(which)),
            None => prop_assert!(*sv == (raw as u16) as i64),
        }
    }

    #[test]
    fn strings_round_trip(s in proptest::option::of(".*")) {
        let m = Marshaler::default();
        let mut hv = Hv::new();
        m.store(&mut hv, "name", &s).unwrap();
        prop_assert_eq!(m.fetch::<_, Option<String>>(&hv, "name", true).unwrap(), Some(s));
    }

    #[test]
    fn signed_and_bool_round_trip(i in any::<i64>(), b in any::<bool>()) {
        let m = Marshaler::default();
        let mut hv = Hv::new();
        m.store(&mut hv, "i", &i).unwrap();
        m.store(&mut hv, "b", &b).unwrap();
        prop_assert_eq!(m.fetch::<_, i64>(&hv, "i", true).unwrap(), Some(i));
        prop_assert_eq!(m.fetch::<_, bool>(&hv, "b", true).unwrap(), Some(b));
    }
}
