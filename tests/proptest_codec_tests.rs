//! Property-based tests for the codec and address derivation
//!
//! These tests use proptest to generate random values and verify that:
//! 1. Every value of a schema type survives encode then decode unchanged
//! 2. Decoding arbitrary bytes never panics
//! 3. Derivation is deterministic and sensitive to every seed byte

use proptest::prelude::*;
use solana_sdk::pubkey::Pubkey;
use solidl::{find_program_address, Codec, EnumFields, Registry, Value};
use std::sync::{Arc, OnceLock};

const SCHEMA: &str = r#"{
    "instructions": [],
    "accounts": [{"name": "Sample"}],
    "types": [
        {"name": "Sample", "type": {"kind": "struct", "fields": [
            {"name": "flag", "type": "bool"},
            {"name": "small", "type": "i8"},
            {"name": "wide", "type": "u128"},
            {"name": "signed", "type": "i64"},
            {"name": "ratio", "type": "f64"},
            {"name": "owner", "type": "pubkey"},
            {"name": "label", "type": "string"},
            {"name": "blob", "type": "bytes"},
            {"name": "points", "type": {"vec": "u32"}},
            {"name": "pair", "type": {"array": ["u16", 2]}},
            {"name": "maybe", "type": {"option": "u64"}},
            {"name": "cmaybe", "type": {"coption": "u8"}},
            {"name": "shape", "type": {"defined": "Shape"}},
            {"name": "tight", "type": {"defined": "Tight"}}
        ]}},
        {"name": "Shape", "type": {"kind": "enum", "variants": [
            {"name": "Empty"},
            {"name": "Circle", "fields": ["u32"]},
            {"name": "Rect", "fields": [{"name": "w", "type": "u16"}, {"name": "h", "type": "u16"}]}
        ]}},
        {"name": "Tight", "lengthPrefix": "u16", "tagWidth": "u32", "type": {"kind": "struct", "fields": [
            {"name": "names", "type": {"vec": "string"}}
        ]}}
    ]
}"#;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

fn codec() -> &'static Codec {
    static CODEC: OnceLock<Codec> = OnceLock::new();
    CODEC.get_or_init(|| Codec::new(Arc::new(Registry::from_json(SCHEMA).unwrap())))
}

fn shape() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::unit_variant("Empty")),
        any::<u32>().prop_map(|r| Value::Enum {
            variant: "Circle".into(),
            fields: EnumFields::Tuple(vec![Value::U32(r)]),
        }),
        (any::<u16>(), any::<u16>()).prop_map(|(w, h)| Value::Enum {
            variant: "Rect".into(),
            fields: EnumFields::Named(vec![("w".into(), Value::U16(w)), ("h".into(), Value::U16(h))]),
        }),
    ]
}

fn option_of<S: Strategy<Value = Value>>(inner: S) -> impl Strategy<Value = Value> {
    prop::option::of(inner).prop_map(|v| match v {
        Some(v) => Value::some(v),
        None => Value::none(),
    })
}

fn sample() -> impl Strategy<Value = Value> {
    let scalars = (
        any::<bool>(),
        any::<i8>(),
        any::<u128>(),
        any::<i64>(),
        -1.0e12f64..1.0e12f64,
        any::<[u8; 32]>(),
        "[a-zA-Z0-9 ]{0,24}",
    );
    let composites = (
        prop::collection::vec(any::<u8>(), 0..48),
        prop::collection::vec(any::<u32>(), 0..8),
        any::<[u16; 2]>(),
        option_of(any::<u64>().prop_map(Value::U64)),
        option_of(any::<u8>().prop_map(Value::U8)),
        shape(),
        prop::collection::vec("[a-z]{0,6}", 0..4),
    );
    (scalars, composites).prop_map(
        |((flag, small, wide, signed, ratio, owner, label), (blob, points, pair, maybe, cmaybe, shape, names))| {
            Value::structure([
                ("flag", Value::Bool(flag)),
                ("small", Value::I8(small)),
                ("wide", Value::U128(wide)),
                ("signed", Value::I64(signed)),
                ("ratio", Value::F64(ratio)),
                ("owner", Value::Pubkey(Pubkey::new_from_array(owner))),
                ("label", Value::String(label)),
                ("blob", Value::Bytes(blob)),
                ("points", Value::Vec(points.into_iter().map(Value::U32).collect())),
                ("pair", Value::Array(pair.iter().copied().map(Value::U16).collect())),
                ("maybe", maybe),
                ("cmaybe", cmaybe),
                ("shape", shape),
                (
                    "tight",
                    Value::structure([(
                        "names",
                        Value::Vec(names.into_iter().map(Value::String).collect()),
                    )]),
                ),
            ])
        },
    )
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_record_round_trip(value in sample()) {
        let bytes = codec().encode_account("Sample", &value).unwrap();
        let (decoded, used) = codec().decode_account("Sample", &bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(used, bytes.len());
    }

    #[test]
    fn prop_trailing_bytes_ignored(value in sample(), extra in prop::collection::vec(any::<u8>(), 1..16)) {
        let mut bytes = codec().encode_account("Sample", &value).unwrap();
        let len = bytes.len();
        bytes.extend(extra);
        let (decoded, used) = codec().decode_account("Sample", &bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(used, len);
    }

    #[test]
    fn prop_truncation_is_an_error(value in sample(), cut in 1usize..64) {
        let bytes = codec().encode_account("Sample", &value).unwrap();
        let keep = bytes.len().saturating_sub(cut);
        prop_assert!(codec().decode_account("Sample", &bytes[..keep]).is_err());
    }

    #[test]
    fn prop_decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec().decode("Sample", &bytes);
        let _ = codec().decode_any_account(&bytes);
    }

    #[test]
    fn prop_derivation_deterministic(
        seed in prop::collection::vec(any::<u8>(), 1..32),
        program in any::<[u8; 32]>(),
    ) {
        let program = Pubkey::new_from_array(program);
        let first = find_program_address(&[&seed[..]], &program).unwrap();
        let second = find_program_address(&[&seed[..]], &program).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_derivation_sensitive_to_each_byte(
        seed in prop::collection::vec(any::<u8>(), 1..32),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255,
    ) {
        let program = Pubkey::new_from_array([3; 32]);
        let mut changed = seed.clone();
        let i = index.index(changed.len());
        changed[i] ^= flip;
        let (a, _) = find_program_address(&[&seed[..]], &program).unwrap();
        let (b, _) = find_program_address(&[&changed[..]], &program).unwrap();
        prop_assert_ne!(a, b);
    }
}
