//! Character reader over a buffered byte source
//!
//! Decodes UTF-8 one character at a time with a single character of lookahead. Only the
//! reader's own buffer is ever held in memory.

use std::io::{self, BufRead};

pub struct CharReader<R> {
    inner: R,
    peeked: Option<char>,
}

impl<R: BufRead> CharReader<R> {
    pub fn new(inner: R) -> Self {
        CharReader {
            inner,
            peeked: None,
        }
    }

    /// Look at the next character without consuming it. `None` is end of input.
    pub fn peek(&mut self) -> io::Result<Option<char>> {
        if self.peeked.is_none() {
            self.peeked = self.decode()?;
        }
        Ok(self.peeked)
    }

    /// Consume the next character.
    pub fn next_char(&mut self) -> io::Result<Option<char>> {
        match self.peeked.take() {
            Some(ch) => Ok(Some(ch)),
            None => self.decode(),
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = loop {
            match self.inner.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }

    fn decode(&mut self) -> io::Result<Option<char>> {
        let first = match self.read_byte()? {
            Some(byte) => byte,
            None => return Ok(None),
        };

        let width = utf8_width(first);
        if width == 0 {
            return Err(invalid_data("invalid UTF-8 leading byte"));
        }

        let mut bytes = [first, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            *slot = self
                .read_byte()?
                .ok_or_else(|| invalid_data("truncated UTF-8 sequence"))?;
        }

        let text = std::str::from_utf8(&bytes[..width])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(text.chars().next())
    }
}

fn utf8_width(byte: u8) -> usize {
    match byte {
        0x00..=0x7F => 1,
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 0,
    }
}

fn invalid_data(msg: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn read_all<R: BufRead>(reader: &mut CharReader<R>) -> String {
        let mut out = String::new();
        while let Some(ch) = reader.next_char().unwrap() {
            out.push(ch);
        }
        out
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut reader = CharReader::new("ab".as_bytes());
        assert_eq!(reader.peek().unwrap(), Some('a'));
        assert_eq!(reader.peek().unwrap(), Some('a'));
        assert_eq!(reader.next_char().unwrap(), Some('a'));
        assert_eq!(reader.next_char().unwrap(), Some('b'));
        assert_eq!(reader.peek().unwrap(), None);
        assert_eq!(reader.next_char().unwrap(), None);
    }

    #[test]
    fn test_multibyte_across_buffer_boundaries() {
        // A one byte buffer forces every multibyte character to straddle refills
        let source = "héllo → wörld 🦀";
        let mut reader = CharReader::new(BufReader::with_capacity(1, source.as_bytes()));
        assert_eq!(read_all(&mut reader), source);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let mut reader = CharReader::new(&[b'a', 0xFF][..]);
        assert_eq!(reader.next_char().unwrap(), Some('a'));
        let err = reader.next_char().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_truncated_sequence_is_an_error() {
        let mut reader = CharReader::new(&[0xE2, 0x86][..]);
        assert!(reader.next_char().is_err());
    }
}
