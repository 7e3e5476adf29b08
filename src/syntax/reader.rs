//! Character-level access to a command file.
//!
//! [`SourceReader`] pulls UTF-8 text from any [`BufRead`] one line at a time
//! and hands out characters with one character of lookahead (plus a peek at
//! the character after it, which the lexer needs to recognise `//` and `/*`).
//! It tracks the byte offset and 1-based line of the next character, and keeps
//! everything read so far so diagnostics can show the offending source.

use std::io::{self, BufRead};

/// Line-buffered UTF-8 reader with position tracking.
#[derive(Debug)]
pub struct SourceReader<R> {
    inner: R,
    /// The line currently being consumed, including its `\n` if any.
    buf: String,
    /// Byte position of the next character inside `buf`.
    pos: usize,
    /// Byte offset of `buf` within the whole input.
    buf_offset: usize,
    line: usize,
    consumed: String,
    exhausted: bool,
}

impl<R: BufRead> SourceReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: String::new(),
            pos: 0,
            buf_offset: 0,
            line: 1,
            consumed: String::new(),
            exhausted: false,
        }
    }

    /// Ensures at least one unread character is buffered.
    ///
    /// Returns `false` once the input is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        while self.pos >= self.buf.len() {
            if self.exhausted {
                return Ok(false);
            }
            self.buf_offset += self.buf.len();
            self.buf.clear();
            self.pos = 0;
            if self.inner.read_line(&mut self.buf)? == 0 {
                self.exhausted = true;
                return Ok(false);
            }
            self.consumed.push_str(&self.buf);
        }
        Ok(true)
    }

    /// Returns the next character without consuming it.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.buf[self.pos..].chars().next())
    }

    /// Returns the character after the next one, if it is on the same line.
    ///
    /// Both characters of a comment marker always share a line, so this never
    /// needs to read ahead into the next line.
    pub fn peek_second(&mut self) -> io::Result<Option<char>> {
        if !self.fill()? {
            return Ok(None);
        }
        let mut chars = self.buf[self.pos..].chars();
        chars.next();
        Ok(chars.next())
    }

    /// Consumes and returns the next character.
    pub fn next_char(&mut self) -> io::Result<Option<char>> {
        let Some(ch) = self.peek()? else {
            return Ok(None);
        };
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Ok(Some(ch))
    }

    /// Byte offset of the next character.
    pub fn offset(&self) -> usize {
        self.buf_offset + self.pos
    }

    /// 1-based line of the next character.
    pub fn line(&self) -> usize {
        self.line
    }

    /// All text read from the source so far.
    pub fn consumed(&self) -> &str {
        &self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_offsets_and_lines() {
        let mut reader = SourceReader::new("ab\nc".as_bytes());
        assert_eq!(reader.line(), 1);
        assert_eq!(reader.next_char().unwrap(), Some('a'));
        assert_eq!(reader.next_char().unwrap(), Some('b'));
        assert_eq!(reader.offset(), 2);
        assert_eq!(reader.next_char().unwrap(), Some('\n'));
        assert_eq!(reader.line(), 2);
        assert_eq!(reader.peek().unwrap(), Some('c'));
        assert_eq!(reader.offset(), 3);
        assert_eq!(reader.next_char().unwrap(), Some('c'));
        assert_eq!(reader.next_char().unwrap(), None);
        assert_eq!(reader.next_char().unwrap(), None);
        assert_eq!(reader.consumed(), "ab\nc");
    }

    #[test]
    fn test_multibyte_offsets() {
        let mut reader = SourceReader::new("\"é\"x".as_bytes());
        reader.next_char().unwrap();
        assert_eq!(reader.next_char().unwrap(), Some('é'));
        assert_eq!(reader.offset(), 3);
        assert_eq!(reader.peek_second().unwrap(), Some('x'));
    }

    #[test]
    fn test_peek_second_stays_on_line() {
        let mut reader = SourceReader::new("/\n/".as_bytes());
        assert_eq!(reader.peek().unwrap(), Some('/'));
        assert_eq!(reader.peek_second().unwrap(), Some('\n'));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let bytes: &[u8] = &[b'a', 0xff, b'\n'];
        let mut reader = SourceReader::new(bytes);
        let err = reader.peek().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
