//! Encode/decode round-trip properties over the supported type lattice.

use std::collections::BTreeMap;

use crashd_wire::{Body, Decode, Encode, Fields, Wire};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;

fn roundtrip<T>(value: &T) -> T
where
    T: Encode + Decode + Wire,
{
    let mut body = Body::new();
    body.push(value);
    let (decoded, fields) = T::load(&mut body.cursor()).expect("decode of encoded value");
    assert_eq!(fields, Fields::Last);
    decoded
}

proptest! {
    #[test]
    fn scalars_roundtrip(a in any::<i32>(), b in any::<u32>(), c in any::<i64>(), d in any::<u64>(), e in any::<bool>(), s in ".*") {
        prop_assert_eq!(roundtrip(&a), a);
        prop_assert_eq!(roundtrip(&b), b);
        prop_assert_eq!(roundtrip(&c), c);
        prop_assert_eq!(roundtrip(&d), d);
        prop_assert_eq!(roundtrip(&e), e);
        prop_assert_eq!(roundtrip(&s), s);
    }

    #[test]
    fn sequences_roundtrip(v in vec(".*", 0..8)) {
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn mappings_roundtrip(m in btree_map(".*", ".*", 0..8)) {
        prop_assert_eq!(roundtrip(&m), m);
    }

    #[test]
    fn crash_info_lists_roundtrip(infos in vec(btree_map("[a-z]{1,8}", ".*", 0..4), 0..4)) {
        prop_assert_eq!(roundtrip(&infos), infos);
    }

    #[test]
    fn nested_settings_roundtrip(settings in btree_map("[a-z]{1,8}", btree_map("[a-z]{1,8}", ".*", 0..4), 0..4)) {
        prop_assert_eq!(roundtrip(&settings), settings);
    }

    #[test]
    fn report_status_roundtrip(status in btree_map("[a-z]{1,8}", vec(".*", 0..4), 0..4)) {
        prop_assert_eq!(roundtrip(&status), status);
    }
}
