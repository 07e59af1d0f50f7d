use crate::graph::{BytecodeBlob, Datum, FunctionRecord, NodeId};
use crate::serde::ConstSubtag;

/// Interpreter-internal singletons that may appear where an object is expected.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum SpecialConst {
    NullObject,
    StopIteration,
    Sentinel,
    PauseVm,
}

impl SpecialConst {
    pub fn subtag(self) -> ConstSubtag {
        match self {
            Self::NullObject => ConstSubtag::NullObject,
            Self::StopIteration => ConstSubtag::StopIteration,
            Self::Sentinel => ConstSubtag::Sentinel,
            Self::PauseVm => ConstSubtag::PauseVm,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum ErrorOrigin {
    /// The encoder wrote an error record in place of an object it could not persist.
    Stream,
    /// The resolver did not know an externally resolved object.
    Unresolved { name: Vec<u8> },
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ErrorRecord {
    pub message: String,
    pub origin: ErrorOrigin,
}

/// An object the stream names rather than contains, as returned by the resolver.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ExternalObject {
    pub name: Vec<u8>,
    pub object: Box<Datum>,
}

/// A decoded value inside an [`crate::graph::ObjectGraph`].
///
/// Nested values are [`NodeId`] handles. A back-reference in the stream resolves to the handle
/// of the value it points at, so shared and cyclic structure is preserved.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Value {
    Bytes(Vec<u8>),
    /// Both `str` and interned `qstr` values.
    Str(String),
    Int(u64),
    Bool(bool),
    Null,
    Special(SpecialConst),
    Tuple(Vec<NodeId>),
    List(Vec<NodeId>),
    /// Entries in first-insertion order; keys are unique.
    Dict(Vec<(NodeId, NodeId)>),
    Error(ErrorRecord),
    External(ExternalObject),
    Bytecode(BytecodeBlob<NodeId>),
    Function(FunctionRecord<NodeId>),
    BuiltinFunction { name: NodeId },
}

impl Value {
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Tuple(members) | Self::List(members) => members.clone(),
            Self::Dict(entries) => entries.iter().flat_map(|(k, v)| [*k, *v]).collect(),
            Self::Bytecode(bc) => bc.children().into_iter().copied().collect(),
            Self::Function(fun) => fun.children().into_iter().copied().collect(),
            Self::BuiltinFunction { name } => vec![*name],
            Self::Bytes(_)
            | Self::Str(_)
            | Self::Int(_)
            | Self::Bool(_)
            | Self::Null
            | Self::Special(_)
            | Self::Error(_)
            | Self::External(_) => vec![],
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "str",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Null => "none",
            Self::Special(_) => "special",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Error(_) => "error",
            Self::External(_) => "external",
            Self::Bytecode(_) => "bytecode",
            Self::Function(_) => "function",
            Self::BuiltinFunction { .. } => "builtin_function",
        }
    }
}
