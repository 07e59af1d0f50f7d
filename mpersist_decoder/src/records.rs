use crate::dispatch::Decoder;
use crate::{ints, DecodeError};
use anyhow::{bail, Result};
use mpersist_types::graph::{BytecodeBlob, FunctionFlags, FunctionRecord, Slot, Value};
use mpersist_types::serde::BYTECODE_FORMAT_VERSION;

impl<'b, 'r> Decoder<'b, 'r> {
    pub(crate) fn load_function(&mut self) -> Result<Value> {
        let globals = self.load()?;
        let n_pos_args = self.cur.take_u8()?;
        let n_kwonly_args = self.cur.take_u8()?;
        let n_def_args = self.cur.take_u8()?;
        let flags = FunctionFlags::from(self.cur.take_u8()?);
        let extra_args = ints::load_fixed(&mut self.cur, 4)? as u32;

        let bc_offset = self.cur.tell();
        let bytecode = self.load()?;
        match self.graph.slot(bytecode) {
            Some(Slot::Ready(Value::Bytecode(_))) => {}
            _ => bail!(DecodeError::UnexpectedKind {
                offset: bc_offset,
                expected: "a bytecode blob",
            }),
        }

        Ok(Value::Function(FunctionRecord {
            globals,
            n_pos_args,
            n_kwonly_args,
            n_def_args,
            flags,
            extra_args,
            bytecode,
        }))
    }

    pub(crate) fn load_bytecode(&mut self) -> Result<Value> {
        let offset = self.cur.tell();
        let found = self.cur.take_u8()?;
        if found != BYTECODE_FORMAT_VERSION {
            bail!(DecodeError::VersionMismatch { offset, found });
        }

        let block_name = self.load()?;
        let source_file = self.load()?;

        let arg_names_ct = ints::load_size(&mut self.cur)?;
        let mut arg_names = Vec::with_capacity(arg_names_ct);
        for _ in 0..arg_names_ct {
            arg_names.push(self.load()?);
        }

        let n_state = ints::load_fixed(&mut self.cur, 2)? as u16;
        let n_exc_stack = ints::load_fixed(&mut self.cur, 2)? as u16;

        let local_nums_ct = ints::load_size_of(&mut self.cur, 4)?;
        let mut local_nums = Vec::with_capacity(local_nums_ct);
        for _ in 0..local_nums_ct {
            local_nums.push(ints::load_fixed(&mut self.cur, 4)? as u32);
        }

        let lineno_info = self.load_blob()?;
        let body = self.load_blob()?;

        Ok(Value::Bytecode(BytecodeBlob {
            block_name,
            source_file,
            arg_names,
            n_state,
            n_exc_stack,
            local_nums,
            lineno_info,
            body,
        }))
    }
}
