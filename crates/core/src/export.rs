//! Streaming reader for conversation exports.
//!
//! An export is one JSON array of conversation objects that can be far larger
//! than memory. [`ExportReader`] frames one array element at a time from a
//! buffered reader and decodes it with `serde_json`, so only a single record
//! is ever held in memory.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::EXPORT_READ_BUFFER_BYTES;
use crate::{Conversation, ExportError};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Start,
    First,
    Rest,
    Done,
}

/// Tracks nesting and string state while scanning one JSON value.
#[derive(Debug, Default)]
struct Framer {
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Framer {
    /// Feeds one byte; returns true once the outermost value has closed.
    fn feed(&mut self, byte: u8) -> bool {
        if self.in_string {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return false;
        }
        match byte {
            b'"' => self.in_string = true,
            b'{' | b'[' => self.depth += 1,
            b'}' | b']' => {
                self.depth = self.depth.saturating_sub(1);
                return self.depth == 0;
            },
            _ => {},
        }
        false
    }
}

/// Lazy iterator over the conversations of an export, in source order.
///
/// The iterator is fused after the first error.
#[derive(Debug)]
pub struct ExportReader<R> {
    reader: R,
    offset: u64,
    record: usize,
    state: ReaderState,
    buf: Vec<u8>,
}

impl ExportReader<BufReader<File>> {
    /// Opens an export file for streaming.
    ///
    /// # Errors
    /// Returns [`ExportError::Open`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ExportError> {
        let file = File::open(path)
            .map_err(|source| ExportError::Open { path: path.to_path_buf(), source })?;
        Ok(Self::new(BufReader::with_capacity(EXPORT_READ_BUFFER_BYTES, file)))
    }
}

impl<R: BufRead> ExportReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0, record: 0, state: ReaderState::Start, buf: Vec::new() }
    }

    /// Bytes consumed so far.
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of records decoded so far.
    pub const fn records_read(&self) -> usize {
        self.record
    }

    fn parse_error(&self, message: impl Into<String>) -> ExportError {
        ExportError::Parse { offset: self.offset, record: self.record, message: message.into() }
    }

    fn peek(&mut self) -> Result<Option<u8>, ExportError> {
        let offset = self.offset;
        let available =
            self.reader.fill_buf().map_err(|source| ExportError::Read { offset, source })?;
        Ok(available.first().copied())
    }

    fn bump(&mut self, count: usize) {
        self.reader.consume(count);
        self.offset += count as u64;
    }

    fn skip_whitespace(&mut self) -> Result<Option<u8>, ExportError> {
        loop {
            match self.peek()? {
                Some(b' ' | b'\t' | b'\n' | b'\r') => self.bump(1),
                other => return Ok(other),
            }
        }
    }

    fn skip_bom(&mut self) -> Result<(), ExportError> {
        let offset = self.offset;
        let available =
            self.reader.fill_buf().map_err(|source| ExportError::Read { offset, source })?;
        if available.starts_with(&UTF8_BOM) {
            self.bump(UTF8_BOM.len());
        }
        Ok(())
    }

    /// Copies the bytes of the next JSON object into `self.buf`.
    fn read_object(&mut self) -> Result<(), ExportError> {
        self.buf.clear();
        let mut framer = Framer::default();
        loop {
            let offset = self.offset;
            let available =
                self.reader.fill_buf().map_err(|source| ExportError::Read { offset, source })?;
            if available.is_empty() {
                return Err(self.parse_error("unexpected end of input inside a record"));
            }
            let end = available.iter().position(|&byte| framer.feed(byte));
            let take = end.map_or(available.len(), |pos| pos + 1);
            self.buf.extend_from_slice(&available[..take]);
            self.bump(take);
            if end.is_some() {
                return Ok(());
            }
        }
    }

    /// Consumes the closing bracket and rejects anything but whitespace after it.
    fn finish(&mut self) -> Result<(), ExportError> {
        self.bump(1);
        self.state = ReaderState::Done;
        match self.skip_whitespace()? {
            None => Ok(()),
            Some(_) => Err(self.parse_error("trailing data after the end of the array")),
        }
    }

    fn advance(&mut self) -> Result<Option<Conversation>, ExportError> {
        match self.state {
            ReaderState::Done => return Ok(None),
            ReaderState::Start => {
                self.skip_bom()?;
                match self.skip_whitespace()? {
                    Some(b'[') => {
                        self.bump(1);
                        self.state = ReaderState::First;
                    },
                    Some(_) => return Err(self.parse_error("expected '[' at start of export")),
                    None => return Err(self.parse_error("empty input, expected an array")),
                }
                if self.skip_whitespace()? == Some(b']') {
                    self.finish()?;
                    return Ok(None);
                }
            },
            ReaderState::First => {
                if self.skip_whitespace()? == Some(b']') {
                    self.finish()?;
                    return Ok(None);
                }
            },
            ReaderState::Rest => match self.skip_whitespace()? {
                Some(b']') => {
                    self.finish()?;
                    return Ok(None);
                },
                Some(b',') => self.bump(1),
                Some(_) => return Err(self.parse_error("expected ',' or ']' after a record")),
                None => return Err(self.parse_error("unexpected end of input, array not closed")),
            },
        }

        match self.skip_whitespace()? {
            Some(b'{') => {},
            Some(b']') => return Err(self.parse_error("trailing comma before ']'")),
            Some(_) => return Err(self.parse_error("expected a conversation object")),
            None => return Err(self.parse_error("unexpected end of input, array not closed")),
        }

        let start = self.offset;
        self.read_object()?;
        let conversation: Conversation =
            serde_json::from_slice(&self.buf).map_err(|err| ExportError::Parse {
                offset: start,
                record: self.record,
                message: format!("record does not match the conversation shape: {err}"),
            })?;
        self.record += 1;
        self.state = ReaderState::Rest;
        Ok(Some(conversation))
    }
}

impl<R: BufRead> Iterator for ExportReader<R> {
    type Item = Result<Conversation, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(conversation) => conversation.map(Ok),
            Err(err) => {
                self.state = ReaderState::Done;
                Some(Err(err))
            },
        }
    }
}
