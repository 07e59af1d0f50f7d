/// A decode routine. Tag bytes map onto routines through a [`crate::serde::FormatVersion`]'s table.
///
/// The set is closed: every routine the decoder can run is listed here,
/// and every version's table is a `match` onto this enum.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Routine {
    Bytes,
    Str,
    Qstr,
    Tuple,
    List,
    Dict,
    Int,
    SmallInt,
    Const,
    BackRef16,
    BackRef32,
    Error,
    Extended,
    Function,
    BuiltinFunction,
    Bytecode,
    External,
    Unsupported,
    Root,
}

impl Routine {
    pub const ALL: [Routine; 19] = [
        Routine::Bytes,
        Routine::Str,
        Routine::Qstr,
        Routine::Tuple,
        Routine::List,
        Routine::Dict,
        Routine::Int,
        Routine::SmallInt,
        Routine::Const,
        Routine::BackRef16,
        Routine::BackRef32,
        Routine::Error,
        Routine::Extended,
        Routine::Function,
        Routine::BuiltinFunction,
        Routine::Bytecode,
        Routine::External,
        Routine::Unsupported,
        Routine::Root,
    ];

    /// The name an extended tag uses to select this routine.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bytes => "bytes",
            Self::Str => "str",
            Self::Qstr => "qstr",
            Self::Tuple => "tuple",
            Self::List => "list",
            Self::Dict => "dict",
            Self::Int => "int",
            Self::SmallInt => "small_int",
            Self::Const => "const",
            Self::BackRef16 => "ref16",
            Self::BackRef32 => "ref32",
            Self::Error => "error",
            Self::Extended => "extended",
            Self::Function => "function",
            Self::BuiltinFunction => "builtin_function",
            Self::Bytecode => "bytecode",
            Self::External => "external",
            Self::Unsupported => "unsupported",
            Self::Root => "root",
        }
    }

    /// Atomic values cannot contain a back-reference to themselves,
    /// so they are filed only once fully decoded.
    pub fn is_atomic(self) -> bool {
        match self {
            Self::Bytes
            | Self::Str
            | Self::Qstr
            | Self::Int
            | Self::SmallInt
            | Self::Const
            | Self::Error
            | Self::External => true,
            Self::Tuple
            | Self::List
            | Self::Dict
            | Self::Function
            | Self::BuiltinFunction
            | Self::Bytecode => false,
            Self::BackRef16
            | Self::BackRef32
            | Self::Extended
            | Self::Unsupported
            | Self::Root => false,
        }
    }

    /// Whether the routine's start offset is entered into the reference table.
    pub fn is_filed(self) -> bool {
        !matches!(self, Self::Const | Self::Unsupported)
    }

    /// Width in bytes of the encoded target offset, for back-reference routines.
    pub fn ref_width(self) -> Option<usize> {
        match self {
            Self::BackRef16 => Some(2),
            Self::BackRef32 => Some(4),
            _ => None,
        }
    }
}
