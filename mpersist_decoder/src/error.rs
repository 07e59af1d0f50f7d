use derive_more::Display;
use std::error;

/// Every way a parse can fail. Offsets are absolute positions in the stream.
///
/// Raised through `anyhow`; classify with `err.downcast_ref::<DecodeError>()`.
#[derive(PartialEq, Eq, Clone, Debug, Display)]
pub enum DecodeError {
    #[display(fmt = "Not a persist stream; leading bytes {:02x?}.", found)]
    Format { found: Vec<u8> },

    #[display(
        fmt = "Truncated at {}: {} bytes declared, {} available.",
        offset,
        wanted,
        available
    )]
    Truncation {
        offset: usize,
        wanted: u64,
        available: usize,
    },

    #[display(fmt = "Unknown tag {:#04x} at {}.", tag, offset)]
    UnknownTag { offset: usize, tag: u8 },

    #[display(fmt = "Unsupported tag {:#04x} at {}.", tag, offset)]
    UnsupportedTag { offset: usize, tag: u8 },

    #[display(fmt = "Back-reference at {} to unregistered offset {}.", offset, target)]
    DanglingReference { offset: usize, target: u64 },

    #[display(fmt = "Bytecode format marker {:#04x} at {} is not supported.", found, offset)]
    VersionMismatch { offset: usize, found: u8 },

    #[display(fmt = "No line feed within the line window at {}.", offset)]
    LineTooLong { offset: usize },

    #[display(fmt = "No NUL terminator within the message window at {}.", offset)]
    MessageTooLong { offset: usize },

    #[display(fmt = "Unknown extended tag {:?} at {}.", name, offset)]
    UnknownExtendedTag { offset: usize, name: String },

    #[display(fmt = "The stream has no root value.")]
    MissingRoot,

    #[display(fmt = "End of stream at {}.", offset)]
    EndOfStream { offset: usize },

    #[display(fmt = "Invalid length selector {:#04x} at {}.", selector, offset)]
    InvalidLengthSelector { offset: usize, selector: u8 },

    #[display(fmt = "Unknown constant subtag {:#04x} at {}.", subtag, offset)]
    UnknownConstant { offset: usize, subtag: u8 },

    #[display(fmt = "Invalid UTF-8 text at {}.", offset)]
    InvalidUtf8 { offset: usize },

    #[display(fmt = "Unknown format version {:?}.", version)]
    UnknownFormatVersion { version: String },

    #[display(fmt = "Second root value at {}.", offset)]
    DuplicateRoot { offset: usize },

    #[display(fmt = "Expected {} at {}.", expected, offset)]
    UnexpectedKind {
        offset: usize,
        expected: &'static str,
    },

    #[display(fmt = "Value at {} is nested more than {} deep.", offset, max_depth)]
    NestingTooDeep { offset: usize, max_depth: usize },

    #[display(fmt = "Offset {} is already registered to another value.", offset)]
    ReassignedOffset { offset: usize },

    #[display(fmt = "The parser already failed.")]
    Poisoned,
}

impl error::Error for DecodeError {}
