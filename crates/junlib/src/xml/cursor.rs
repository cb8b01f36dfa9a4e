//! Byte cursor over XML input with line/column tracking

use crate::error::Pos;

#[derive(Clone, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    offset: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    pub fn current(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    /// Unread input
    pub fn rest(&self) -> &'a [u8] {
        self.input.get(self.offset..).unwrap_or_default()
    }

    pub fn starts_with(&self, pattern: &[u8]) -> bool {
        self.rest().starts_with(pattern)
    }

    pub fn advance(&mut self) {
        let Some(b) = self.current() else {
            return;
        };
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if b & 0xC0 != 0x80 {
            // continuation bytes of a UTF-8 sequence share the column of its lead byte
            self.col += 1;
        }
    }

    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    pub fn skip_whitespace(&mut self) {
        self.take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
    }

    /// Consume bytes while `pred` holds and return them
    pub fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.offset;
        while self.current().is_some_and(&pred) {
            self.advance();
        }
        self.input.get(start..self.offset).unwrap_or_default()
    }

    /// Consume up to the next `terminator` and the terminator itself.
    /// Returns the bytes before it, or `None` (input exhausted) if absent.
    pub fn take_until(&mut self, terminator: &[u8]) -> Option<&'a [u8]> {
        let start = self.offset;
        while !self.is_eof() {
            if self.starts_with(terminator) {
                let taken = self.input.get(start..self.offset).unwrap_or_default();
                self.advance_by(terminator.len());
                return Some(taken);
            }
            self.advance();
        }
        None
    }

    pub fn consume(&mut self, expected: u8) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub const fn position(&self) -> Pos {
        Pos::new(self.offset, self.line, self.col)
    }

    pub const fn is_eof(&self) -> bool {
        self.offset >= self.input.len()
    }
}
