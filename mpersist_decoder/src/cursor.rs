use crate::DecodeError;
use anyhow::{bail, Result};
use mpersist_types::serde::{CSTR_WINDOW, LINE_WINDOW};
use std::ops::Range;

/// A sequential read window over a fixed buffer.
///
/// The position only moves forward, except through [`ByteCursor::seek`].
/// It never exceeds the buffer length.
#[derive(Clone, Debug)]
pub struct ByteCursor<'b> {
    buf: &'b [u8],
    pos: usize,
}

impl<'b> ByteCursor<'b> {
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Absolute repositioning.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            bail!(DecodeError::Truncation {
                offset: self.pos,
                wanted: pos as u64,
                available: self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// The next `n` bytes, or all remaining bytes for `None`.
    /// A short buffer yields a short slice; the position advances by what was returned.
    pub fn read(&mut self, n: Option<usize>) -> &'b [u8] {
        let start = self.pos;
        let end = match n {
            None => self.buf.len(),
            Some(n) => start.saturating_add(n).min(self.buf.len()),
        };
        self.pos = end;
        &self.buf[start..end]
    }

    /// Exactly `n` bytes, or a truncation error.
    pub fn take(&mut self, n: usize) -> Result<&'b [u8]> {
        let offset = self.pos;
        let got = self.read(Some(n));
        if got.len() < n {
            bail!(DecodeError::Truncation {
                offset,
                wanted: n as u64,
                available: got.len(),
            });
        }
        Ok(got)
    }

    pub fn take_u8(&mut self) -> Result<u8> {
        let got = self.take(1)?;
        Ok(got[0])
    }

    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// One line, line feed included.
    ///
    /// Looks ahead at most [`LINE_WINDOW`] bytes, rewinds, then reads exactly through the line feed.
    pub fn readline(&mut self) -> Result<&'b [u8]> {
        let start = self.tell();
        let preview = self.read(Some(LINE_WINDOW));
        self.seek(start)?;

        match preview.iter().position(|&b| b == b'\n') {
            None => bail!(DecodeError::LineTooLong { offset: start }),
            Some(lf) => Ok(self.read(Some(lf + 1))),
        }
    }

    /// A NUL-terminated byte string within [`CSTR_WINDOW`] bytes. The NUL is consumed, not returned.
    pub fn read_cstr(&mut self) -> Result<&'b [u8]> {
        let start = self.tell();
        let preview = self.read(Some(CSTR_WINDOW));
        self.seek(start)?;

        match preview.iter().position(|&b| b == 0) {
            None => bail!(DecodeError::MessageTooLong { offset: start }),
            Some(nul) => {
                let s = self.read(Some(nul));
                self.read(Some(1));
                Ok(s)
            }
        }
    }

    /// Raw bytes of an already-consumed range, for tracing.
    pub fn slice(&self, range: Range<usize>) -> &'b [u8] {
        let end = range.end.min(self.buf.len());
        let start = range.start.min(end);
        &self.buf[start..end]
    }
}
