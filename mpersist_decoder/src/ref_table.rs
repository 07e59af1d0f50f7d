use crate::DecodeError;
use anyhow::{bail, Result};
use mpersist_types::graph::NodeId;
use std::collections::BTreeMap;

/// Start offset of a value (the offset of its tag byte) to the node it decoded to.
///
/// An offset is bound at most once.
#[derive(Default, Debug)]
pub struct ReferenceTable {
    entries: BTreeMap<usize, NodeId>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binds `offset`. Re-binding to the same node is a no-op.
    pub fn insert(&mut self, offset: usize, id: NodeId) -> Result<()> {
        match self.entries.get(&offset) {
            Some(existing) if *existing != id => bail!(DecodeError::ReassignedOffset { offset }),
            Some(_) => Ok(()),
            None => {
                self.entries.insert(offset, id);
                Ok(())
            }
        }
    }

    /// Resolves a back-reference read at `offset` pointing at `target`.
    pub fn resolve(&self, offset: usize, target: u64) -> Result<NodeId> {
        let found = usize::try_from(target)
            .ok()
            .and_then(|target| self.entries.get(&target));
        match found {
            None => bail!(DecodeError::DanglingReference { offset, target }),
            Some(id) => Ok(*id),
        }
    }

    pub fn get(&self, offset: usize) -> Option<NodeId> {
        self.entries.get(&offset).copied()
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.entries.contains_key(&offset)
    }

    /// Entries in offset order.
    pub fn iter(&self) -> impl '_ + Iterator<Item = (usize, NodeId)> {
        self.entries.iter().map(|(offset, id)| (*offset, *id))
    }
}
