use anyhow::Result;
use derive_more::{Deref, From};

/// Call-signature bits of a compiled function.
#[derive(From, Deref, PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
pub struct FunctionFlags(u8);
impl FunctionFlags {
    pub const HAS_DEF_KW_ARGS: u8 = 1 << 0;
    pub const TAKES_VAR_ARGS: u8 = 1 << 2;
    pub const TAKES_KW_ARGS: u8 = 1 << 3;

    pub fn has_def_kw_args(&self) -> bool {
        self.0 & Self::HAS_DEF_KW_ARGS != 0
    }
    pub fn takes_var_args(&self) -> bool {
        self.0 & Self::TAKES_VAR_ARGS != 0
    }
    pub fn takes_kw_args(&self) -> bool {
        self.0 & Self::TAKES_KW_ARGS != 0
    }
}

/// A compiled-function record. Descriptive only; nothing here is ever executed.
///
/// `C` is the representation of nested values:
/// a [`crate::graph::NodeId`] inside the graph, a [`crate::graph::Datum`] in the owned view.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FunctionRecord<C> {
    /// The enclosing namespace.
    pub globals: C,
    pub n_pos_args: u8,
    pub n_kwonly_args: u8,
    pub n_def_args: u8,
    pub flags: FunctionFlags,
    pub extra_args: u32,
    pub bytecode: C,
}

impl<C> FunctionRecord<C> {
    pub fn try_map<D>(&self, mut f: impl FnMut(&C) -> Result<D>) -> Result<FunctionRecord<D>> {
        Ok(FunctionRecord {
            globals: f(&self.globals)?,
            n_pos_args: self.n_pos_args,
            n_kwonly_args: self.n_kwonly_args,
            n_def_args: self.n_def_args,
            flags: self.flags,
            extra_args: self.extra_args,
            bytecode: f(&self.bytecode)?,
        })
    }

    pub fn children(&self) -> Vec<&C> {
        vec![&self.globals, &self.bytecode]
    }
}

/// Raw code of one compiled block. Instruction and line-number bytes are kept verbatim.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct BytecodeBlob<C> {
    pub block_name: C,
    pub source_file: C,
    pub arg_names: Vec<C>,
    pub n_state: u16,
    pub n_exc_stack: u16,
    pub local_nums: Vec<u32>,
    pub lineno_info: Vec<u8>,
    pub body: Vec<u8>,
}

impl<C> BytecodeBlob<C> {
    pub fn try_map<D>(&self, mut f: impl FnMut(&C) -> Result<D>) -> Result<BytecodeBlob<D>> {
        let block_name = f(&self.block_name)?;
        let source_file = f(&self.source_file)?;
        let arg_names = self.arg_names.iter().map(&mut f).collect::<Result<Vec<_>>>()?;
        Ok(BytecodeBlob {
            block_name,
            source_file,
            arg_names,
            n_state: self.n_state,
            n_exc_stack: self.n_exc_stack,
            local_nums: self.local_nums.clone(),
            lineno_info: self.lineno_info.clone(),
            body: self.body.clone(),
        })
    }

    pub fn children(&self) -> Vec<&C> {
        let mut children = vec![&self.block_name, &self.source_file];
        children.extend(self.arg_names.iter());
        children
    }
}
