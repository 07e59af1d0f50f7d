use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// The byte following a constant tag.
#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum ConstSubtag {
    None = b'N',
    True = b'T',
    False = b'F',
    NullObject = b'0',
    StopIteration = b'4',
    Sentinel = b'8',
    PauseVm = b'P',
}

impl ConstSubtag {
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_u8(b)
    }

    /// Interpreter-internal markers, as opposed to the language-level `None`/`True`/`False`.
    pub fn is_internal_marker(self) -> bool {
        !matches!(self, Self::None | Self::True | Self::False)
    }
}
