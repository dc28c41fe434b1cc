//! Input sources for the context stack.
//!
//! Any [`Read`] can feed a context. Pre-recorded token streams are a source
//! of their own: they skip character scanning but still flow through the
//! same stack, EOF/EOI handling and unget deque.

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::record::RecordedToken;

pub(crate) enum Feed {
    Bytes(Box<dyn Read + Send>),
    Tokens(VecDeque<RecordedToken>),
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feed::Bytes(_) => f.write_str("Bytes(..)"),
            Feed::Tokens(records) => f.debug_tuple("Tokens").field(&records.len()).finish(),
        }
    }
}

/// A source to push on the context stack.
#[derive(Debug)]
pub struct Source {
    pub(crate) feed: Feed,
    pub(crate) tag: Arc<str>,
    pub(crate) want_eof: bool,
}

impl Source {
    /// Read from any reader.
    pub fn reader(tag: &str, reader: impl Read + Send + 'static) -> Self {
        Self::new(tag, Feed::Bytes(Box::new(reader)))
    }

    /// Read from an in-memory string.
    pub fn text(tag: &str, text: &str) -> Self {
        Self::bytes(tag, text.as_bytes().to_vec())
    }

    /// Read from in-memory bytes.
    pub fn bytes(tag: &str, bytes: Vec<u8>) -> Self {
        Self::reader(tag, io::Cursor::new(bytes))
    }

    /// Open a file; the tag is its path.
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::reader(&path.display().to_string(), file))
    }

    /// Replay recorded tokens.
    pub fn tokens(tag: &str, records: impl IntoIterator<Item = RecordedToken>) -> Self {
        Self::new(tag, Feed::Tokens(records.into_iter().collect()))
    }

    fn new(tag: &str, feed: Feed) -> Self {
        Self {
            feed,
            tag: tag.into(),
            want_eof: false,
        }
    }

    /// Return an EOF token when this source ends, before resuming the
    /// source below it.
    #[must_use]
    pub fn want_eof(mut self, on: bool) -> Self {
        self.want_eof = on;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}
