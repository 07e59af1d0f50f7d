use crate::helpers::stream_builder::StreamBuilder;
use crate::helpers::{decode, decode_err};
use anyhow::Result;
use mpersist_decoder::DecodeError;
use mpersist_types::graph::{Datum, Value};
use mpersist_types::serde::{ConstSubtag, FormatVersion};

#[test]
fn list_containing_itself() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    let list = b.list(2);
    b.str("x");
    b.back_ref(list);
    let snap = decode(&b.build())?;
    let root = snap.root();

    let graph = snap.graph();
    match graph.value(root)? {
        Value::List(members) => assert_eq!(members[1], root),
        val => panic!("Not a list: {val:?}"),
    }
    assert_eq!(graph.pending_count(), 0);
    assert_eq!(
        graph.to_datum(root)?,
        Datum::List(vec![Datum::str("x"), Datum::Cycle(root)])
    );
    Ok(())
}

#[test]
fn dict_containing_itself() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    let dict = b.dict(1);
    b.str("self");
    b.back_ref(dict);
    let snap = decode(&b.build())?;
    let root = snap.root();

    match snap.graph().value(root)? {
        Value::Dict(entries) => assert_eq!(entries[0].1, root),
        val => panic!("Not a dict: {val:?}"),
    }
    assert_eq!(
        snap.graph().to_datum(root)?,
        Datum::Dict(vec![(Datum::str("self"), Datum::Cycle(root))])
    );
    Ok(())
}

#[test]
fn two_containers_in_a_loop() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    let outer = b.tuple(1);
    b.list(1);
    b.back_ref(outer);
    let snap = decode(&b.build())?;
    let root = snap.root();

    assert_eq!(
        snap.graph().to_datum(root)?,
        Datum::Tuple(vec![Datum::List(vec![Datum::Cycle(root)])])
    );
    Ok(())
}

#[test]
fn back_references_share_one_node() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.tuple(4);
    let shared = b.bytes(b"shared");
    b.back_ref(shared);
    let second_ref = b.back_ref(shared);
    /* A back-reference to a back-reference ends at the same value. */
    b.back_ref(second_ref);
    let snap = decode(&b.build())?;

    let graph = snap.graph();
    let members = match graph.value(snap.root())? {
        Value::Tuple(members) => members.clone(),
        val => panic!("Not a tuple: {val:?}"),
    };
    assert_eq!(members.len(), 4);
    assert!(members.iter().all(|&id| id == members[0]));
    assert_eq!(graph.in_degrees()[*members[0]], 4);
    assert_eq!(snap.table().get(shared), Some(members[0]));
    assert_eq!(snap.table().get(second_ref), Some(members[0]));

    /* The tree view duplicates shared nodes; only ancestors become cycles. */
    assert_eq!(
        graph.to_datum(snap.root())?,
        Datum::Tuple(vec![Datum::bytes("shared"); 4])
    );
    Ok(())
}

#[test]
fn reference_to_root_offset() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    let root = b.root();
    b.str("r");
    let after = b.back_ref(root);
    let snap = decode(&b.build())?;

    assert_eq!(snap.table().get(root), Some(snap.root()));
    assert_eq!(snap.table().get(after), Some(snap.root()));
    assert_eq!(snap.top_level(), &vec![snap.root(), snap.root()]);
    Ok(())
}

#[test]
fn forward_reference_dangles() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    b.root();
    b.tuple(2);
    let back_ref = b.offset();
    let target = back_ref + 3;
    b.back_ref(target);
    b.str("later");

    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::DanglingReference {
            offset: back_ref,
            target: target as u64
        }
    );
    Ok(())
}

#[test]
fn constants_cannot_be_referenced() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::V1);
    let none = b.constant(ConstSubtag::None);
    b.root();
    let back_ref = b.back_ref(none);

    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::DanglingReference {
            offset: back_ref,
            target: none as u64
        }
    );
    Ok(())
}

#[test]
fn draft_cannot_reference_an_ancestor() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::Draft);
    b.root();
    let list = b.list(1);
    let back_ref = b.back_ref(list);

    assert_eq!(
        decode_err(decode(&b.build())),
        DecodeError::DanglingReference {
            offset: back_ref,
            target: list as u64
        }
    );
    Ok(())
}

#[test]
fn draft_references_finished_values() -> Result<()> {
    let mut b = StreamBuilder::new(FormatVersion::Draft);
    let inner = b.tuple(1);
    b.str("t");
    b.root();
    b.list(2);
    b.back_ref(inner);
    b.back_ref(inner);
    let snap = decode(&b.build())?;

    let t = Datum::Tuple(vec![Datum::str("t")]);
    assert_eq!(
        snap.graph().to_datum(snap.root())?,
        Datum::List(vec![t.clone(), t])
    );
    assert_eq!(snap.top_level().len(), 2);
    Ok(())
}
