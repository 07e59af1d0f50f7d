use crate::helpers::stream_builder::StreamBuilder;
use crate::helpers::{decode, decode_err, decode_root};
use anyhow::{anyhow, Result};
use mpersist_decoder::{decode_snapshot, DecodeError};
use mpersist_types::graph::{Datum, ErrorOrigin, ErrorRecord, ExternalObject, Value};
use mpersist_types::serde::{FormatVersion, CSTR_WINDOW};

#[test]
fn extended_names_select_routines() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.extended("tuple");
    b.size(2);
    b.extended("str");
    b.raw(b"1\x02hi");
    b.extended("small_int");
    b.raw(b"\x00\x00\x01\x00");

    assert_eq!(
        decode_root(&b.build())?,
        Datum::Tuple(vec![Datum::str("hi"), Datum::Int(256)])
    );
    Ok(())
}

#[test]
fn unknown_extended_name() -> Result<()> {
    for name in ["complex", "extended", ""] {
        let mut b = StreamBuilder::new(FormatVersion::V1);
        b.root();
        let tag = b.extended(name);
        assert_eq!(
            decode_err(decode(&b.build())),
            DecodeError::UnknownExtendedTag {
                offset: tag + 1,
                name: String::from(name)
            }
        );
    }
    Ok(())
}

#[test]
fn error_message_window() -> Result<()> {
    let msg = "e".repeat(CSTR_WINDOW - 1);
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.error(&msg);
    assert_eq!(
        decode_root(&b.build())?,
        Datum::Error(ErrorRecord {
            message: msg,
            origin: ErrorOrigin::Stream
        })
    );

    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    let err = b.error(&"e".repeat(CSTR_WINDOW));
    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::MessageTooLong { offset: err + 2 }
    );
    Ok(())
}

#[test]
fn unsupported_values_abort() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.list(1);
    let x = b.unsupported();
    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::UnsupportedTag {
            offset: x,
            tag: b'X'
        }
    );
    Ok(())
}

#[test]
fn external_objects_resolve_by_name() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.tuple(2);
    b.external("sys.stdout");
    let missing = b.external("socket.socket");
    let buf = b.build();

    let resolver = |name: &[u8]| -> Result<Datum> {
        match name {
            b"sys.stdout" => Ok(Datum::str("<stdout>")),
            _ => Err(anyhow!("unknown")),
        }
    };
    let snap = decode_snapshot(&buf, &resolver)?;

    assert_eq!(
        snap.graph().to_datum(snap.root())?,
        Datum::Tuple(vec![
            Datum::External(ExternalObject {
                name: b"sys.stdout".to_vec(),
                object: Box::new(Datum::str("<stdout>")),
            }),
            Datum::Error(ErrorRecord {
                message: String::from("failed to find original object: unknown"),
                origin: ErrorOrigin::Unresolved {
                    name: b"socket.socket".to_vec()
                },
            }),
        ])
    );

    /* The unresolved object is still filed, so it can be referenced. */
    let id = snap.table().get(missing);
    assert!(id.is_some());
    assert!(matches!(
        id.map(|id| snap.graph().value(id)).transpose()?,
        Some(Value::Error(_))
    ));
    Ok(())
}

#[test]
fn without_a_resolver_externals_become_errors() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.external("machine.Pin");
    match decode_root(&b.build())? {
        Datum::Error(ErrorRecord {
            origin: ErrorOrigin::Unresolved { name },
            ..
        }) => assert_eq!(name, b"machine.Pin"),
        dat => panic!("Expected an unresolved error; got {dat:?}"),
    }
    Ok(())
}
