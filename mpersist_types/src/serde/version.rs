use crate::serde::{ConstSubtag, Routine};
use anyhow::Result;
use regex::Regex;

/// A revision of the stream format. Each revision owns a closed tag table.
///
/// The revision is chosen from the header's version line, never by looking at the values.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum FormatVersion {
    /// The first persister: no dicts, ints or externals; `o`/`O` back-references.
    Draft,
    /// The "micropython persist v0.1" persister.
    V1,
}

impl FormatVersion {
    pub const ALL: [FormatVersion; 2] = [FormatVersion::Draft, FormatVersion::V1];

    /// Maps a header version line (`v0`, `v0.1`, `v1`, ...) onto a revision.
    /// `Ok(None)` means the line is well-formed text that names no known revision.
    pub fn from_version_line(line: &str) -> Result<Option<Self>> {
        let reg = Regex::new(r"^v(\d+)(?:\.(\d+))?$")?;
        let caps = match reg.captures(line.trim()) {
            None => return Ok(None),
            Some(caps) => caps,
        };
        let major = caps[1].parse::<u32>()?;
        let minor = match caps.get(2) {
            None => None,
            Some(m) => Some(m.as_str().parse::<u32>()?),
        };
        let ver = match (major, minor) {
            (0, None) | (0, Some(0)) => Some(Self::Draft),
            (0, Some(1)) => Some(Self::V1),
            (1, _) => Some(Self::V1),
            _ => None,
        };
        Ok(ver)
    }

    /// The version line this revision's encoder writes.
    pub fn version_line(self) -> &'static str {
        match self {
            Self::Draft => "v0.0",
            Self::V1 => "v0.1",
        }
    }

    /// The tag table.
    pub fn routine(self, tag: u8) -> Option<Routine> {
        match self {
            Self::Draft => match tag {
                b'b' => Some(Routine::Bytes),
                b's' => Some(Routine::Str),
                b't' => Some(Routine::Tuple),
                b'l' => Some(Routine::List),
                b'C' => Some(Routine::Const),
                b'o' => Some(Routine::BackRef16),
                b'O' => Some(Routine::BackRef32),
                b'E' => Some(Routine::Error),
                b'F' => Some(Routine::BuiltinFunction),
                b'X' => Some(Routine::Unsupported),
                b'M' => Some(Routine::Root),
                _ => None,
            },
            Self::V1 => match tag {
                b'b' => Some(Routine::Bytes),
                b's' => Some(Routine::Str),
                b'q' => Some(Routine::Qstr),
                b't' => Some(Routine::Tuple),
                b'l' => Some(Routine::List),
                b'd' => Some(Routine::Dict),
                b'i' => Some(Routine::Int),
                b'S' => Some(Routine::SmallInt),
                b'C' => Some(Routine::Const),
                b'O' => Some(Routine::BackRef16),
                b'Q' => Some(Routine::BackRef32),
                b'E' => Some(Routine::Extended),
                b'F' => Some(Routine::Function),
                b'U' => Some(Routine::External),
                b'X' => Some(Routine::Unsupported),
                b'M' => Some(Routine::Root),
                _ => None,
            },
        }
    }

    /// The tag byte that selects `routine` directly, if any.
    pub fn tag(self, routine: Routine) -> Option<u8> {
        (0..=u8::MAX).find(|&tag| self.routine(tag) == Some(routine))
    }

    /// Routines reachable through the extended tag, looked up by [`Routine::name`].
    pub fn extended_routine(self, name: &[u8]) -> Option<Routine> {
        Routine::ALL
            .into_iter()
            .filter(|&r| r != Routine::Extended)
            .filter(|&r| r == Routine::Bytecode || self.tag(r).is_some())
            .find(|r| r.name().as_bytes() == name)
    }

    pub fn has_extended_tag(self) -> bool {
        self.tag(Routine::Extended).is_some()
    }

    /// Whether non-atomic values are filed as placeholders before their children are decoded.
    pub fn uses_placeholders(self) -> bool {
        match self {
            Self::Draft => false,
            Self::V1 => true,
        }
    }

    pub fn allows_const(self, subtag: ConstSubtag) -> bool {
        match self {
            Self::Draft => !subtag.is_internal_marker(),
            Self::V1 => true,
        }
    }
}
