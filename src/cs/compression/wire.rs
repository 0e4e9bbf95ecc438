//! Character cursor used by the parenthesized wire formats (RLE, LZ78, BWT).

use crate::cs::error::{Error, Result};

/// Reads an encoded text one character at a time, reporting positions in characters.
pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(text: &str) -> Self {
        Cursor {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Characters not yet consumed.
    pub(crate) fn remaining(&self) -> &[char] {
        &self.chars[self.pos.min(self.chars.len())..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    /// Consume any single character.
    pub(crate) fn next_char(&mut self) -> Result<char> {
        let ch = self
            .chars
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::format(format!("unexpected end of input at {}", self.pos)))?;
        self.pos += 1;
        Ok(ch)
    }

    /// Consume `expected` or fail.
    pub(crate) fn expect(&mut self, expected: char) -> Result<()> {
        let at = self.pos;
        match self.next_char()? {
            ch if ch == expected => Ok(()),
            ch => Err(Error::format(format!(
                "expected {:?} at {}, found {:?}",
                expected, at, ch
            ))),
        }
    }

    /// Consume a non-empty run of ASCII digits and return its value.
    pub(crate) fn number(&mut self) -> Result<usize> {
        let start = self.pos;
        while self.pos < self.chars.len() && self.chars[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(Error::format(format!("expected a number at {}", start)));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits
            .parse()
            .map_err(|_| Error::format(format!("number {} at {} is out of range", digits, start)))
    }
}
