use crate::helpers::gen::write_datum;
use crate::helpers::stream_builder::StreamBuilder;
use crate::helpers::{decode, decode_err, decode_root};
use anyhow::Result;
use mpersist_decoder::DecodeError;
use mpersist_types::graph::{Datum, ErrorOrigin, ErrorRecord, SpecialConst, Value};
use mpersist_types::serde::{ConstSubtag, FormatVersion};

fn sample() -> Datum {
    Datum::Tuple(vec![
        Datum::str("name"),
        Datum::List(vec![Datum::Bool(true), Datum::Null, Datum::bytes(b"\x00\x01")]),
        Datum::Tuple(vec![]),
    ])
}

#[test]
fn common_kinds_decode_alike() -> Result<()> {
    let mut decoded = vec![];
    for version in FormatVersion::ALL {
        let mut b = StreamBuilder::new(version);
        b.root();
        write_datum(&mut b, &sample());
        let snap = decode(&b.build())?;
        assert_eq!(snap.version(), version);
        decoded.push(snap.graph().to_datum(snap.root())?);
    }
    assert!(decoded.iter().all(|dat| dat == &sample()));
    Ok(())
}

#[test]
fn version_lines() -> Result<()> {
    for (line, version) in [
        ("v0", FormatVersion::Draft),
        ("v0.0", FormatVersion::Draft),
        ("v0.1", FormatVersion::V1),
        ("v1", FormatVersion::V1),
        ("v1.3", FormatVersion::V1),
    ] {
        let mut b = StreamBuilder::with_header(b"MP\x80\x01", "micropython persist", line, version);
        b.root();
        b.str("s");
        assert_eq!(decode(&b.build())?.version(), version, "{line}");
    }

    let mut b = StreamBuilder::with_header(b"MP\x80\x01", "fmt", "persist-2", FormatVersion::V1);
    b.root();
    b.str("s");
    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::UnknownFormatVersion {
            version: String::from("persist-2")
        }
    );
    Ok(())
}

#[test]
fn back_reference_tags() -> Result<()> {
    for (version, narrow, wide) in [
        (FormatVersion::Draft, b'o', b'O'),
        (FormatVersion::V1, b'O', b'Q'),
    ] {
        let mut b = StreamBuilder::new(version);
        let target = b.str("t");
        b.root();
        b.tuple(2);
        let r2 = b.back_ref_of_width(target, 2);
        let r4 = b.back_ref_of_width(target, 4);
        let buf = b.build();

        assert_eq!(buf[r2], narrow);
        assert_eq!(buf[r4], wide);
        assert_eq!(r4 - r2, 3);
        assert_eq!(buf.len() - r4, 5);
        assert_eq!(
            decode_root(&buf)?,
            Datum::Tuple(vec![Datum::str("t"), Datum::str("t")])
        );
    }
    Ok(())
}

#[test]
fn tags_outside_a_version_are_unknown() -> Result<()> {
    for (version, tags) in [
        (FormatVersion::Draft, b"qdiSUQ".as_slice()),
        (FormatVersion::V1, b"o".as_slice()),
    ] {
        for &tag in tags {
            let mut b = StreamBuilder::new(version);
            b.root();
            let offset = b.raw(&[tag, b'0']);
            assert_eq!(
                decode_err(decode(&b.build())),
                DecodeError::UnknownTag { offset, tag }
            );
        }
    }
    Ok(())
}

#[test]
fn special_constants() -> Result<()> {
    for special in [
        SpecialConst::NullObject,
        SpecialConst::StopIteration,
        SpecialConst::Sentinel,
        SpecialConst::PauseVm,
    ] {
        let mut b = StreamBuilder::new(FormatVersion::V1);
        b.root();
        b.constant(special.subtag());
        assert_eq!(decode_root(&b.build())?, Datum::Special(special));

        let mut b = StreamBuilder::new(FormatVersion::Draft);
        b.root();
        let offset = b.constant(special.subtag());
        assert_eq!(
            decode_err(decode(&b.build())),
            DecodeError::UnknownConstant {
                offset: offset + 1,
                subtag: special.subtag() as u8
            }
        );
    }

    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    let offset = b.raw(b"CZ");
    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::UnknownConstant {
            offset: offset + 1,
            subtag: b'Z'
        }
    );
    Ok(())
}

#[test]
fn draft_builtin_function() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::Draft);
    b.root();
    b.builtin_function();
    let name = b.str("len");
    let snap = decode(&b.build())?;

    match snap.graph().value(snap.root())? {
        Value::BuiltinFunction { name: id } => {
            assert_eq!(snap.table().get(name), Some(*id));
        }
        val => panic!("Not a builtin function: {val:?}"),
    }
    assert_eq!(
        snap.graph().to_datum(snap.root())?,
        Datum::BuiltinFunction(Box::new(Datum::str("len")))
    );
    Ok(())
}

#[test]
fn error_records_in_both_versions() -> Result<()> {
    for version in FormatVersion::ALL {
        let mut b = StreamBuilder::new(version);
        b.root();
        b.list(2);
        let err = b.error("can't persist <socket>");
        b.constant(ConstSubtag::False);
        let buf = b.build();

        assert_eq!(&buf[err..err + 2], b"E:");
        assert_eq!(
            decode_root(&buf)?,
            Datum::List(vec![
                Datum::Error(ErrorRecord {
                    message: String::from("can't persist <socket>"),
                    origin: ErrorOrigin::Stream,
                }),
                Datum::Bool(false),
            ])
        );
    }
    Ok(())
}
