//! # Serialization format
//!
//! A persist stream is a short text header followed by a flat sequence of tagged values.
//!
//! ```text
//! magic:          [u8; 4]     // "MP\x80\x01" unless configured otherwise
//!                 b'\n'
//! format_name:    [u8; ..]    // e.g. "micropython persist"
//!                 b'\n'
//! version:        [u8; ..]    // e.g. "v0.1"; selects a `FormatVersion`
//!                 b'\n'
//! values:         { tag: u8, payload: [u8; ..] } ...   // until the end of the buffer
//! ```
//!
//! The tag byte selects a [`Routine`] through the tag table of the stream's [`FormatVersion`].
//! The same byte may select different routines in different versions.
//!
//! Sizes and counts are length-selected integers: one ASCII [`LengthSelector`] digit,
//! then that many big-endian payload bytes.
//!
//! ```text
//! struct Size {
//!     selector:   u8,             // b'0' | b'1' | b'2' | b'4' | b'8'
//!     payload:    [u8; selector], // absent for b'0', which means zero
//! }
//! ```
//!
//! Every value's start offset (the offset of its tag byte, counted from the start of the buffer,
//! header included) is the address by which later back-references refer to it.
//!
//! ```text
//! struct Bytes or Str or Qstr {
//!     tag:        u8,
//!     len:        Size,
//!     body:       [u8; len],
//! }
//!
//! struct Tuple or List {
//!     tag:        u8,
//!     count:      Size,
//!     members:    [Value; count],
//! }
//!
//! struct Dict {
//!     tag:        u8,
//!     count:      Size,
//!     entries:    [(key: Value, value: Value); count],
//! }
//!
//! struct BackRef {
//!     tag:        u8,
//!     offset:     [u8; 2] or [u8; 4],
//! }
//!
//! struct FunctionRecord {
//!     tag:            u8,
//!     globals:        Value,
//!     n_pos_args:     u8,
//!     n_kwonly_args:  u8,
//!     n_def_args:     u8,
//!     flags:          u8,
//!     extra_args:     [u8; 4],
//!     bytecode:       Value,      // a BytecodeBlob, or a back-reference to one
//! }
//!
//! struct BytecodeBlob {           // reached through the extended tag: b"E" b"bytecode\0"
//!     marker:         u8,         // b'0'
//!     block_name:     Value,
//!     source_file:    Value,
//!     arg_names:      { count: Size, names: [Value; count] },
//!     n_state:        [u8; 2],
//!     n_exc_stack:    [u8; 2],
//!     local_nums:     { count: Size, nums: [[u8; 4]; count] },
//!     lineno_info:    { len: Size, body: [u8; len] },
//!     body:           { len: Size, body: [u8; len] },
//! }
//! ```

mod constants;
mod lengths;
mod routine;
mod version;

pub use constants::*;
pub use lengths::*;
pub use routine::*;
pub use version::*;

/// Marker byte that opens every bytecode blob this decoder understands.
pub const BYTECODE_FORMAT_VERSION: u8 = b'0';

/// Bytes scanned for the terminating newline of a header line.
pub const LINE_WINDOW: usize = 1024;

/// Bytes scanned for the terminating NUL of an extended tag name or an error message.
pub const CSTR_WINDOW: usize = 1024;
