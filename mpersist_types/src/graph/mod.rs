//! The decoded object graph.
//!
//! Values live in an arena and refer to each other by [`NodeId`].
//! A container is given its handle before any of its children are decoded
//! ([`ObjectGraph::reserve`]) and is completed afterwards ([`ObjectGraph::fill`]),
//! so a child may refer back to an ancestor that is still being built.

use anyhow::{anyhow, Result};
use derive_more::{Deref, From};
use std::any;

mod datum;
mod keys;
mod records;
mod value;

pub use datum::*;
pub use keys::*;
pub use records::*;
pub use value::*;

/// Depth at which tree-shaped walks of the graph give up.
///
/// Back-references let a graph be far deeper than the nesting of any one value in the stream.
pub const TREE_DEPTH_LIMIT: usize = 512;

/// A stable index into an [`ObjectGraph`].
#[derive(From, Deref, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct NodeId(usize);

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Slot {
    /// Reserved; its value is still being decoded.
    Pending,
    Ready(Value),
}

#[derive(Default, Debug)]
pub struct ObjectGraph {
    slots: Vec<Slot>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Phase one of two-phase construction.
    pub fn reserve(&mut self) -> NodeId {
        self.slots.push(Slot::Pending);
        NodeId(self.slots.len() - 1)
    }

    /// Phase two of two-phase construction. A slot is filled exactly once.
    pub fn fill(&mut self, id: NodeId, val: Value) -> Result<()> {
        match self.slots.get_mut(id.0) {
            None => Err(anyhow!("{id:?} is not in the graph.")),
            Some(Slot::Ready(_)) => Err(anyhow!("{id:?} is already filled.")),
            Some(slot) => {
                *slot = Slot::Ready(val);
                Ok(())
            }
        }
    }

    /// Adds a value that needs no placeholder.
    pub fn push(&mut self, val: Value) -> NodeId {
        self.slots.push(Slot::Ready(val));
        NodeId(self.slots.len() - 1)
    }

    pub fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    /// The value at `id`. Fails for unknown and still-pending handles.
    pub fn value(&self, id: NodeId) -> Result<&Value> {
        match self.slots.get(id.0) {
            Some(Slot::Ready(val)) => Ok(val),
            Some(Slot::Pending) => Err(anyhow!("{id:?} is still pending.")),
            None => Err(anyhow!(
                "{id:?} is not in this {}.",
                any::type_name::<Self>()
            )),
        }
    }

    pub fn is_pending(&self, id: NodeId) -> bool {
        matches!(self.slots.get(id.0), Some(Slot::Pending))
    }

    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|slot| **slot == Slot::Pending).count()
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = (NodeId, &Slot)> {
        self.slots.iter().enumerate().map(|(i, slot)| (NodeId(i), slot))
    }

    /// Number of edges pointing at each node. A node with more than one is shared.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degs = vec![0; self.slots.len()];
        for slot in self.slots.iter() {
            if let Slot::Ready(val) = slot {
                for child in val.children() {
                    if let Some(deg) = degs.get_mut(child.0) {
                        *deg += 1;
                    }
                }
            }
        }
        degs
    }

    /// The owned tree rooted at `id`.
    ///
    /// Edges back to an ancestor, including edges to a still-pending node
    /// (which can only be an ancestor under construction), become [`Datum::Cycle`].
    /// Fails on trees deeper than [`TREE_DEPTH_LIMIT`].
    pub fn to_datum(&self, id: NodeId) -> Result<Datum> {
        let mut ancestors = vec![];
        self.to_datum_(id, &mut ancestors)
    }

    fn to_datum_(&self, id: NodeId, ancestors: &mut Vec<NodeId>) -> Result<Datum> {
        if ancestors.contains(&id) {
            return Ok(Datum::Cycle(id));
        }
        if ancestors.len() >= TREE_DEPTH_LIMIT {
            return Err(anyhow!("The tree under {id:?} is deeper than {TREE_DEPTH_LIMIT}."));
        }
        let val = match self.slots.get(id.0) {
            None => return Err(anyhow!("{id:?} is not in the graph.")),
            Some(Slot::Pending) => return Ok(Datum::Cycle(id)),
            Some(Slot::Ready(val)) => val,
        };

        ancestors.push(id);
        let mut conv = |child: &NodeId| self.to_datum_(*child, ancestors);
        let dat = match val {
            Value::Bytes(b) => Datum::Bytes(b.clone()),
            Value::Str(s) => Datum::Str(s.clone()),
            Value::Int(i) => Datum::Int(*i),
            Value::Bool(b) => Datum::Bool(*b),
            Value::Null => Datum::Null,
            Value::Special(sc) => Datum::Special(*sc),
            Value::Tuple(members) => {
                Datum::Tuple(members.iter().map(&mut conv).collect::<Result<_>>()?)
            }
            Value::List(members) => {
                Datum::List(members.iter().map(&mut conv).collect::<Result<_>>()?)
            }
            Value::Dict(entries) => {
                let mut dat_entries = Vec::with_capacity(entries.len());
                for (k, v) in entries.iter() {
                    dat_entries.push((conv(k)?, conv(v)?));
                }
                Datum::Dict(dat_entries)
            }
            Value::Error(rec) => Datum::Error(rec.clone()),
            Value::External(ext) => Datum::External(ext.clone()),
            Value::Bytecode(bc) => Datum::Bytecode(Box::new(bc.try_map(&mut conv)?)),
            Value::Function(fun) => Datum::Function(Box::new(fun.try_map(&mut conv)?)),
            Value::BuiltinFunction { name } => Datum::BuiltinFunction(Box::new(conv(name)?)),
        };
        ancestors.pop();

        Ok(dat)
    }
}
