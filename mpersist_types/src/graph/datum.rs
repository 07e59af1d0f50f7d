use crate::graph::{BytecodeBlob, ErrorRecord, ExternalObject, FunctionRecord, NodeId, SpecialConst};

/// An owned, tree-shaped view of a decoded value.
///
/// Shared substructure is duplicated. An edge back to an ancestor (a cycle) becomes
/// [`Datum::Cycle`] carrying the ancestor's handle.
///
/// Equality is structural, and dicts compare as unordered collections.
#[derive(Clone, Debug)]
pub enum Datum {
    Bytes(Vec<u8>),
    Str(String),
    Int(u64),
    Bool(bool),
    Null,
    Special(SpecialConst),
    Tuple(Vec<Datum>),
    List(Vec<Datum>),
    Dict(Vec<(Datum, Datum)>),
    Error(ErrorRecord),
    External(ExternalObject),
    Bytecode(Box<BytecodeBlob<Datum>>),
    Function(Box<FunctionRecord<Datum>>),
    BuiltinFunction(Box<Datum>),
    Cycle(NodeId),
}

impl Datum {
    pub fn str<S: Into<String>>(s: S) -> Self {
        Self::Str(s.into())
    }
    pub fn bytes<B: Into<Vec<u8>>>(b: B) -> Self {
        Self::Bytes(b.into())
    }
}

fn dict_eq(slf: &[(Datum, Datum)], oth: &[(Datum, Datum)]) -> bool {
    slf.len() == oth.len()
        && slf.iter().all(|entry| oth.contains(entry))
        && oth.iter().all(|entry| slf.contains(entry))
}

impl PartialEq for Datum {
    fn eq(&self, other: &Datum) -> bool {
        match (self, other) {
            (Self::Bytes(slf), Self::Bytes(oth)) => slf == oth,
            (Self::Str(slf), Self::Str(oth)) => slf == oth,
            (Self::Int(slf), Self::Int(oth)) => slf == oth,
            (Self::Bool(slf), Self::Bool(oth)) => slf == oth,
            (Self::Null, Self::Null) => true,
            (Self::Special(slf), Self::Special(oth)) => slf == oth,
            (Self::Tuple(slf), Self::Tuple(oth)) => slf == oth,
            (Self::List(slf), Self::List(oth)) => slf == oth,
            (Self::Dict(slf), Self::Dict(oth)) => dict_eq(slf, oth),
            (Self::Error(slf), Self::Error(oth)) => slf == oth,
            (Self::External(slf), Self::External(oth)) => slf == oth,
            (Self::Bytecode(slf), Self::Bytecode(oth)) => slf == oth,
            (Self::Function(slf), Self::Function(oth)) => slf == oth,
            (Self::BuiltinFunction(slf), Self::BuiltinFunction(oth)) => slf == oth,
            (Self::Cycle(slf), Self::Cycle(oth)) => slf == oth,
            _ => false,
        }
    }
}
impl Eq for Datum {}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Self::Str(String::from(s))
    }
}
impl From<String> for Datum {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<u64> for Datum {
    fn from(i: u64) -> Self {
        Self::Int(i)
    }
}
impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}
