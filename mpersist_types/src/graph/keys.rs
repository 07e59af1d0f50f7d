use crate::graph::{NodeId, ObjectGraph, Slot, SpecialConst, Value};
use anyhow::{anyhow, Result};
use derive_more::{Deref, From};
use std::collections::{HashMap, HashSet};

/// The identity of a dict key up to structure. Two nodes with equal `KeyId`s are the same key.
#[derive(From, Deref, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct KeyId(usize);

/// A node's shape with its members already replaced by their `KeyId`s.
#[derive(PartialEq, Eq, Hash, Debug)]
enum Shape {
    Bytes(Vec<u8>),
    Str(String),
    Int(u64),
    Bool(bool),
    Null,
    Special(SpecialConst),
    Tuple(Vec<KeyId>),
    List(Vec<KeyId>),
    /// Sorted, so that entry order does not matter.
    Dict(Vec<(KeyId, KeyId)>),
    /// Equal only to itself.
    Node(NodeId),
}

/// Hash-conses nodes into [`KeyId`]s.
///
/// Each node is interned at most once, bottom-up, so the total work over a graph is linear in
/// its size no matter how much structure is shared.
///
/// Values that are compared by identity (records, errors, externals), values still under
/// construction, and nodes that reach themselves get a `KeyId` of their own.
#[derive(Default, Debug)]
pub struct KeyInterner {
    shapes: HashMap<Shape, KeyId>,
    memo: HashMap<NodeId, KeyId>,
}

impl KeyInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn intern(&mut self, graph: &ObjectGraph, start: NodeId) -> Result<KeyId> {
        let mut in_progress = HashSet::new();
        let mut stack = vec![(start, false)];

        while let Some((id, members_done)) = stack.pop() {
            if self.memo.contains_key(&id) {
                continue;
            }
            let val = match graph.slot(id) {
                None => return Err(anyhow!("{id:?} is not in the graph.")),
                Some(Slot::Pending) => {
                    self.memoize(id, Shape::Node(id));
                    continue;
                }
                Some(Slot::Ready(val)) => val,
            };

            if members_done {
                in_progress.remove(&id);
                let shape = self.shape_of(id, val)?;
                self.memoize(id, shape);
                continue;
            }

            if !in_progress.insert(id) {
                /* Reached from inside its own members. */
                self.memoize(id, Shape::Node(id));
                continue;
            }
            stack.push((id, true));
            for member in members(val) {
                if !self.memo.contains_key(&member) {
                    stack.push((member, false));
                }
            }
        }

        self.memo
            .get(&start)
            .copied()
            .ok_or_else(|| anyhow!("{start:?} was not interned."))
    }

    fn memoize(&mut self, id: NodeId, shape: Shape) {
        let next = KeyId(self.shapes.len());
        let key = *self.shapes.entry(shape).or_insert(next);
        self.memo.insert(id, key);
    }

    fn member_key(&self, id: NodeId) -> Result<KeyId> {
        self.memo
            .get(&id)
            .copied()
            .ok_or_else(|| anyhow!("Member {id:?} was not interned."))
    }

    fn shape_of(&self, id: NodeId, val: &Value) -> Result<Shape> {
        let shape = match val {
            Value::Bytes(b) => Shape::Bytes(b.clone()),
            Value::Str(s) => Shape::Str(s.clone()),
            Value::Int(i) => Shape::Int(*i),
            Value::Bool(b) => Shape::Bool(*b),
            Value::Null => Shape::Null,
            Value::Special(sc) => Shape::Special(*sc),
            Value::Tuple(members) => Shape::Tuple(
                members
                    .iter()
                    .map(|&m| self.member_key(m))
                    .collect::<Result<_>>()?,
            ),
            Value::List(members) => Shape::List(
                members
                    .iter()
                    .map(|&m| self.member_key(m))
                    .collect::<Result<_>>()?,
            ),
            Value::Dict(entries) => {
                let mut keys = entries
                    .iter()
                    .map(|&(k, v)| Ok((self.member_key(k)?, self.member_key(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                keys.sort();
                Shape::Dict(keys)
            }
            Value::Error(_)
            | Value::External(_)
            | Value::Bytecode(_)
            | Value::Function(_)
            | Value::BuiltinFunction { .. } => Shape::Node(id),
        };
        Ok(shape)
    }
}

/// Members that take part in a node's shape.
fn members(val: &Value) -> Vec<NodeId> {
    match val {
        Value::Tuple(members) | Value::List(members) => members.clone(),
        Value::Dict(entries) => entries.iter().flat_map(|&(k, v)| [k, v]).collect(),
        _ => vec![],
    }
}
