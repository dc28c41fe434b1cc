//! Raw byte buffering over a reader.
//!
//! [`RawInput`] keeps the unread bytes of a source in a small buffer and
//! reads more on demand. The filler asks for a lookahead window with
//! [`RawInput::ensure`] so marks split across reads are still matched.

use std::io::{self, Read};

/// Bytes requested from the reader per read call.
pub const READ_CHUNK: usize = 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(crate) struct RawInput {
    reader: Box<dyn Read + Send>,
    buf: Vec<u8>,
    start: usize,
    eof: bool,
    bom_checked: bool,
}

impl std::fmt::Debug for RawInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawInput")
            .field("buffered", &(self.buf.len() - self.start))
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

impl RawInput {
    pub fn new(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(READ_CHUNK),
            start: 0,
            eof: false,
            bom_checked: false,
        }
    }

    /// Input already fully in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            reader: Box::new(io::empty()),
            buf: bytes,
            start: 0,
            eof: true,
            bom_checked: true,
        }
    }

    /// Unread buffered bytes.
    #[inline]
    pub fn available(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    #[inline]
    pub fn consume(&mut self, n: usize) {
        self.start = (self.start + n).min(self.buf.len());
    }

    /// The reader reported end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// No more bytes, buffered or unread.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.eof && self.start == self.buf.len()
    }

    /// Read until at least `want` bytes are buffered or the reader ends.
    pub fn ensure(&mut self, want: usize) -> io::Result<()> {
        while self.buf.len() - self.start < want && !self.eof {
            self.read_chunk()?;
        }
        Ok(())
    }

    /// Read at least one more byte unless the reader has ended.
    pub fn read_more(&mut self) -> io::Result<()> {
        let have = self.available().len();
        self.ensure(have + 1)
    }

    fn read_chunk(&mut self) -> io::Result<()> {
        if self.start > 0 {
            self.buf.drain(..self.start);
            self.start = 0;
        }
        let old = self.buf.len();
        self.buf.resize(old + READ_CHUNK, 0);
        let result = loop {
            match self.reader.read(&mut self.buf[old..]) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };
        match result {
            Ok(0) => {
                self.buf.truncate(old);
                self.eof = true;
            }
            Ok(n) => self.buf.truncate(old + n),
            Err(err) => {
                self.buf.truncate(old);
                return Err(err);
            }
        }
        if !self.bom_checked && (self.buf.len() >= UTF8_BOM.len() || self.eof) {
            self.bom_checked = true;
            if self.buf.starts_with(UTF8_BOM) {
                self.start = UTF8_BOM.len();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
