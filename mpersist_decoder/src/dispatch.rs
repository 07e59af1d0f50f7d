use crate::{ints, ByteCursor, DecodeError, ReferenceTable, Resolver};
use anyhow::{anyhow, bail, Result};
use log::{debug, log_enabled, Level};
use mpersist_types::graph::{KeyInterner, NodeId, ObjectGraph, Slot, Value};
use mpersist_types::serde::{FormatVersion, Routine};

/// Bytes of a value's encoding shown in trace lines.
const TRACE_PREVIEW: usize = 32;

/// The decode engine of one parse: a cursor, the reference table and the graph being built.
pub(crate) struct Decoder<'b, 'r> {
    pub cur: ByteCursor<'b>,
    pub version: FormatVersion,
    pub table: ReferenceTable,
    pub graph: ObjectGraph,
    pub root: Option<NodeId>,
    pub resolver: &'r dyn Resolver,
    /// Dict keys seen so far, across all dicts of the stream.
    pub keys: KeyInterner,
    /// Values being decoded right now, outermost first.
    pub depth: usize,
    pub max_depth: usize,
}

impl<'b, 'r> Decoder<'b, 'r> {
    pub fn new(
        cur: ByteCursor<'b>,
        version: FormatVersion,
        resolver: &'r dyn Resolver,
        max_depth: usize,
    ) -> Self {
        Self {
            cur,
            version,
            table: ReferenceTable::new(),
            graph: ObjectGraph::new(),
            root: None,
            resolver,
            keys: KeyInterner::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Decodes the value whose tag is at the cursor and files it under the tag's offset.
    pub fn load(&mut self) -> Result<NodeId> {
        let offset = self.cur.tell();
        let tag = match self.cur.read(Some(1)) {
            [tag] => *tag,
            _ => bail!(DecodeError::EndOfStream { offset }),
        };
        if self.depth >= self.max_depth {
            bail!(DecodeError::NestingTooDeep {
                offset,
                max_depth: self.max_depth,
            });
        }

        self.depth += 1;
        let res = match self.version.routine(tag) {
            None => Err(anyhow!(DecodeError::UnknownTag { offset, tag })),
            Some(Routine::Extended) => self
                .load_extended_routine()
                .and_then(|routine| Ok((routine, self.load_routine(offset, tag, routine)?))),
            Some(routine) => self
                .load_routine(offset, tag, routine)
                .map(|id| (routine, id)),
        };
        self.depth -= 1;

        match res {
            Err(e) => {
                debug!(
                    "#ERR {offset}: {:?}...",
                    self.cur.slice(offset..offset + TRACE_PREVIEW)
                );
                Err(e)
            }
            Ok((routine, id)) => {
                debug_assert!(self.cur.tell() > offset);
                self.trace(offset, routine, id);
                Ok(id)
            }
        }
    }

    /// The extended tag names its routine in a NUL-terminated string.
    /// A `:` in place of the name introduces an error record.
    fn load_extended_routine(&mut self) -> Result<Routine> {
        if self.cur.peek_u8() == Some(b':') {
            return Ok(Routine::Error);
        }

        let offset = self.cur.tell();
        let name = self.cur.read_cstr()?;
        match self.version.extended_routine(name) {
            None => bail!(DecodeError::UnknownExtendedTag {
                offset,
                name: String::from_utf8_lossy(name).into_owned(),
            }),
            Some(routine) => Ok(routine),
        }
    }

    fn load_routine(&mut self, offset: usize, tag: u8, routine: Routine) -> Result<NodeId> {
        match routine {
            Routine::Unsupported => bail!(DecodeError::UnsupportedTag { offset, tag }),
            Routine::Extended => bail!(DecodeError::UnknownExtendedTag {
                offset,
                name: String::from(routine.name()),
            }),
            Routine::BackRef16 => self.load_back_ref(offset, 2),
            Routine::BackRef32 => self.load_back_ref(offset, 4),
            Routine::Root => self.load_root(offset),
            _ if !routine.is_atomic() && self.version.uses_placeholders() => {
                let id = self.graph.reserve();
                self.table.insert(offset, id)?;
                let val = self.load_value(offset, routine)?;
                self.graph.fill(id, val)?;
                Ok(id)
            }
            _ => {
                let val = self.load_value(offset, routine)?;
                let id = self.graph.push(val);
                if routine.is_filed() {
                    self.table.insert(offset, id)?;
                }
                Ok(id)
            }
        }
    }

    fn load_value(&mut self, offset: usize, routine: Routine) -> Result<Value> {
        match routine {
            Routine::Bytes => Ok(Value::Bytes(self.load_blob()?)),
            Routine::Str | Routine::Qstr => self.load_str(),
            Routine::Tuple => Ok(Value::Tuple(self.load_members()?)),
            Routine::List => Ok(Value::List(self.load_members()?)),
            Routine::Dict => self.load_dict(),
            Routine::Int => Ok(Value::Int(ints::load_int(&mut self.cur)?)),
            Routine::Const => self.load_const(),
            Routine::SmallInt => Ok(Value::Int(ints::load_small_int(&mut self.cur)?)),
            Routine::Error => self.load_error_record(),
            Routine::External => self.load_external(),
            Routine::Function => self.load_function(),
            Routine::BuiltinFunction => Ok(Value::BuiltinFunction { name: self.load()? }),
            Routine::Bytecode => self.load_bytecode(),
            Routine::BackRef16
            | Routine::BackRef32
            | Routine::Extended
            | Routine::Unsupported
            | Routine::Root => Err(anyhow!(
                "{} at {offset} does not decode to a value of its own.",
                routine.name()
            )),
        }
    }

    fn load_back_ref(&mut self, offset: usize, width: usize) -> Result<NodeId> {
        let target = ints::load_fixed(&mut self.cur, width)?;
        let id = self.table.resolve(offset, target)?;
        self.table.insert(offset, id)?;
        Ok(id)
    }

    fn load_root(&mut self, offset: usize) -> Result<NodeId> {
        if self.root.is_some() {
            bail!(DecodeError::DuplicateRoot { offset });
        }
        let id = self.load()?;
        if self.root.is_some() {
            bail!(DecodeError::DuplicateRoot { offset });
        }
        self.root = Some(id);
        self.table.insert(offset, id)?;
        Ok(id)
    }

    fn trace(&self, offset: usize, routine: Routine, id: NodeId) {
        if !log_enabled!(Level::Debug) {
            return;
        }
        let end = self.cur.tell().min(offset + TRACE_PREVIEW);
        let raw = self.cur.slice(offset..end);
        match (routine.ref_width(), self.graph.slot(id)) {
            (Some(_), _) => debug!("#{offset}: {raw:?} -> {id:?}"),
            (None, Some(Slot::Ready(val))) => debug!("#{offset}: {raw:?} -> {val:?}"),
            (None, _) => debug!("#{offset}: {raw:?} -> {id:?} (pending)"),
        }
    }
}
