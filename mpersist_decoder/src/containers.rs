use crate::dispatch::Decoder;
use crate::{ints, DecodeError};
use anyhow::{bail, Result};
use log::warn;
use mpersist_types::graph::{
    ErrorOrigin, ErrorRecord, ExternalObject, KeyId, NodeId, SpecialConst, Value,
};
use mpersist_types::serde::ConstSubtag;
use std::collections::hash_map::{Entry, HashMap};

impl<'b, 'r> Decoder<'b, 'r> {
    /// A size-prefixed run of raw bytes, without a tag.
    pub(crate) fn load_blob(&mut self) -> Result<Vec<u8>> {
        let size = ints::load_size(&mut self.cur)?;
        Ok(self.cur.take(size)?.to_vec())
    }

    pub(crate) fn load_str(&mut self) -> Result<Value> {
        let offset = self.cur.tell();
        let body = self.load_blob()?;
        match String::from_utf8(body) {
            Err(_) => bail!(DecodeError::InvalidUtf8 { offset }),
            Ok(s) => Ok(Value::Str(s)),
        }
    }

    /// Members of a tuple or list, in stream order.
    pub(crate) fn load_members(&mut self) -> Result<Vec<NodeId>> {
        let size = ints::load_size(&mut self.cur)?;
        let mut members = Vec::with_capacity(size);
        for _ in 0..size {
            members.push(self.load()?);
        }
        Ok(members)
    }

    /// Key/value pairs in stream order. A repeated key keeps its first position and takes the
    /// last value.
    pub(crate) fn load_dict(&mut self) -> Result<Value> {
        let size = ints::load_size(&mut self.cur)?;
        let mut entries: Vec<(NodeId, NodeId)> = Vec::with_capacity(size);
        let mut positions: HashMap<KeyId, usize> = HashMap::with_capacity(size);
        for _ in 0..size {
            let key = self.load()?;
            let val = self.load()?;

            match positions.entry(self.keys.intern(&self.graph, key)?) {
                Entry::Occupied(pos) => entries[*pos.get()].1 = val,
                Entry::Vacant(pos) => {
                    pos.insert(entries.len());
                    entries.push((key, val));
                }
            }
        }
        Ok(Value::Dict(entries))
    }

    pub(crate) fn load_const(&mut self) -> Result<Value> {
        let offset = self.cur.tell();
        let subtag = self.cur.take_u8()?;
        let known = ConstSubtag::from_byte(subtag).filter(|sub| self.version.allows_const(*sub));
        let val = match known {
            None => bail!(DecodeError::UnknownConstant { offset, subtag }),
            Some(ConstSubtag::None) => Value::Null,
            Some(ConstSubtag::True) => Value::Bool(true),
            Some(ConstSubtag::False) => Value::Bool(false),
            Some(ConstSubtag::NullObject) => Value::Special(SpecialConst::NullObject),
            Some(ConstSubtag::StopIteration) => Value::Special(SpecialConst::StopIteration),
            Some(ConstSubtag::Sentinel) => Value::Special(SpecialConst::Sentinel),
            Some(ConstSubtag::PauseVm) => Value::Special(SpecialConst::PauseVm),
        };
        Ok(val)
    }

    /// `:` then a NUL-terminated message.
    pub(crate) fn load_error_record(&mut self) -> Result<Value> {
        let offset = self.cur.tell();
        if self.cur.take_u8()? != b':' {
            bail!(DecodeError::UnexpectedKind {
                offset,
                expected: "':' opening an error message",
            });
        }

        let msg_offset = self.cur.tell();
        let msg = self.cur.read_cstr()?;
        let message = match String::from_utf8(msg.to_vec()) {
            Err(_) => bail!(DecodeError::InvalidUtf8 { offset: msg_offset }),
            Ok(s) => s,
        };
        Ok(Value::Error(ErrorRecord {
            message,
            origin: ErrorOrigin::Stream,
        }))
    }

    /// A name for the resolver. An unknown name decodes to an error value; the parse goes on.
    pub(crate) fn load_external(&mut self) -> Result<Value> {
        let name = self.load_blob()?;
        match self.resolver.resolve(&name) {
            Ok(dat) => Ok(Value::External(ExternalObject {
                name,
                object: Box::new(dat),
            })),
            Err(e) => {
                warn!(
                    "Unresolved external object {:?}: {e}",
                    String::from_utf8_lossy(&name)
                );
                Ok(Value::Error(ErrorRecord {
                    message: format!("failed to find original object: {e}"),
                    origin: ErrorOrigin::Unresolved { name },
                }))
            }
        }
    }
}
