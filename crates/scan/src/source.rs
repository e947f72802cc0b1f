//! Pull-based character sources feeding the navigator.
//!
//! A source is forward-only: the navigator never seeks or pushes back, and
//! buffers at most one character of look-ahead itself. End of input is a
//! normal condition (`Ok(None)`); a read failure is fatal to the scan call
//! in progress and is never retried.

use std::fmt;
use std::io::Read;
use std::str::Chars;

use tools::Utf8Accumulator;

/// Forward-only character supply.
pub trait CharSource {
    /// Next character, or `Ok(None)` at end of input.
    fn next_char(&mut self) -> Result<Option<char>, SourceError>;
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        (**self).next_char()
    }
}

/// Failure to read from the underlying byte stream.
#[derive(Debug)]
pub struct SourceError {
    inner: std::io::Error,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character source read failed: {}", self.inner)
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

impl From<std::io::Error> for SourceError {
    fn from(inner: std::io::Error) -> Self {
        SourceError { inner }
    }
}

/// Borrowed in-memory source. Infallible.
pub struct StrSource<'a> {
    chars: Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(text: &'a str) -> Self {
        StrSource {
            chars: text.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        Ok(self.chars.next())
    }
}

/// Owned in-memory source. Infallible.
pub struct StringSource {
    buffer: String,
    pos: usize,
}

impl StringSource {
    pub fn new(buffer: String) -> Self {
        StringSource { buffer, pos: 0 }
    }
}

impl CharSource for StringSource {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        let Some(ch) = self.buffer[self.pos..].chars().next() else {
            return Ok(None);
        };
        self.pos += ch.len_utf8();
        Ok(Some(ch))
    }
}

/// Streaming source over any [`Read`], decoding UTF-8 incrementally.
///
/// Multi-byte characters split across read boundaries are carried over;
/// invalid bytes decode to U+FFFD. The decoded buffer is pooled and reused
/// between refills.
pub struct ReaderSource<R: Read> {
    reader: R,
    decoder: Utf8Accumulator,
    decoded: String,
    pos: usize,
    eof: bool,
}

const READ_CHUNK_BYTES: usize = 8 * 1024;

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource {
            reader,
            decoder: Utf8Accumulator::new(),
            decoded: String::new(),
            pos: 0,
            eof: false,
        }
    }

    // Pull chunks until at least one character decodes or the reader ends.
    fn refill(&mut self) -> Result<(), SourceError> {
        self.decoded.clear();
        self.pos = 0;
        let mut chunk = [0u8; READ_CHUNK_BYTES];
        while self.decoded.is_empty() {
            let read = self.reader.read(&mut chunk)?;
            if read == 0 {
                self.decoder.finish(&mut self.decoded);
                self.eof = true;
                return Ok(());
            }
            self.decoder.push(&chunk[..read], &mut self.decoded);
        }
        Ok(())
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        loop {
            if let Some(ch) = self.decoded[self.pos..].chars().next() {
                self.pos += ch.len_utf8();
                return Ok(Some(ch));
            }
            if self.eof {
                return Ok(None);
            }
            self.refill()?;
        }
    }
}
