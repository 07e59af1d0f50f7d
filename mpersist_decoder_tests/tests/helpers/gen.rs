use super::stream_builder::StreamBuilder;
use mpersist_types::graph::Datum;
use mpersist_types::serde::{ConstSubtag, FormatVersion};
use rand::distributions::{Alphanumeric, DistString};
use rand::Rng;

/// A random acyclic datum that `version` can encode.
pub fn gen_datum<R: Rng>(rng: &mut R, version: FormatVersion, depth: usize) -> Datum {
    let has_v1_kinds = version == FormatVersion::V1;
    let leaf_kinds = if has_v1_kinds { 6 } else { 4 };
    let kinds = if depth == 0 { leaf_kinds } else { leaf_kinds + 3 };

    match rng.gen_range(0..kinds) {
        0 => Datum::Null,
        1 => Datum::Bool(rng.gen()),
        2 => {
            let len = rng.gen_range(0..300);
            Datum::Bytes((0..len).map(|_| rng.gen()).collect())
        }
        3 => Datum::Str(gen_str(rng)),
        4 if has_v1_kinds => Datum::Int(gen_int(rng)),
        5 if has_v1_kinds => Datum::Int(rng.gen::<u32>() as u64),
        k if k == leaf_kinds => Datum::Tuple(gen_members(rng, version, depth)),
        k if k == leaf_kinds + 1 => Datum::List(gen_members(rng, version, depth)),
        _ if has_v1_kinds => {
            let len = rng.gen_range(0..6);
            let entries = (0..len)
                .map(|i| {
                    let key = Datum::Str(format!("k{i}_{}", gen_str(rng)));
                    (key, gen_datum(rng, version, depth - 1))
                })
                .collect();
            Datum::Dict(entries)
        }
        _ => Datum::Tuple(vec![]),
    }
}

fn gen_str<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(0..20);
    Alphanumeric.sample_string(rng, len)
}

/// Spread over every length selector.
fn gen_int<R: Rng>(rng: &mut R) -> u64 {
    match rng.gen_range(0..5) {
        0 => 0,
        1 => rng.gen::<u8>() as u64,
        2 => rng.gen::<u16>() as u64,
        3 => rng.gen::<u32>() as u64,
        _ => rng.gen(),
    }
}

fn gen_members<R: Rng>(rng: &mut R, version: FormatVersion, depth: usize) -> Vec<Datum> {
    let len = rng.gen_range(0..5);
    (0..len).map(|_| gen_datum(rng, version, depth - 1)).collect()
}

/// Writes `dat` the way the persister would, without sharing.
///
/// `Int`s are written as length-selected ints. Only the kinds [`gen_datum`] produces are supported.
pub fn write_datum(b: &mut StreamBuilder, dat: &Datum) -> usize {
    match dat {
        Datum::Null => b.constant(ConstSubtag::None),
        Datum::Bool(true) => b.constant(ConstSubtag::True),
        Datum::Bool(false) => b.constant(ConstSubtag::False),
        Datum::Bytes(body) => b.bytes(body),
        Datum::Str(s) => b.str(s),
        Datum::Int(n) => b.int(*n),
        Datum::Tuple(members) => {
            let offset = b.tuple(members.len());
            for m in members {
                write_datum(b, m);
            }
            offset
        }
        Datum::List(members) => {
            let offset = b.list(members.len());
            for m in members {
                write_datum(b, m);
            }
            offset
        }
        Datum::Dict(entries) => {
            let offset = b.dict(entries.len());
            for (k, v) in entries {
                write_datum(b, k);
                write_datum(b, v);
            }
            offset
        }
        _ => panic!("No writer for {dat:?}"),
    }
}
