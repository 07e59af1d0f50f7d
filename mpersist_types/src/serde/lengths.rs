use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// The ASCII digit that precedes a length-selected integer.
#[repr(u8)]
#[derive(PartialEq, Eq, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum LengthSelector {
    Zero = b'0',
    One = b'1',
    Two = b'2',
    Four = b'4',
    Eight = b'8',
}

impl LengthSelector {
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::from_u8(b)
    }

    pub fn payload_len(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// The narrowest selector that can carry `n`.
    pub fn for_value(n: u64) -> Self {
        if n == 0 {
            Self::Zero
        } else if n <= u8::MAX as u64 {
            Self::One
        } else if n <= u16::MAX as u64 {
            Self::Two
        } else if n <= u32::MAX as u64 {
            Self::Four
        } else {
            Self::Eight
        }
    }
}
