use crate::error::{DecodeError, Result};

/// Bounds-checked reader over a 32-bit token stream.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    words: &'a [u32],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, pos: 0 }
    }

    /// Current position in words from the start of the stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.words.len()
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.pos.min(self.words.len())
    }

    pub fn peek(&self) -> Result<u32> {
        self.words
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::Truncated { offset: self.pos })
    }

    pub fn read(&mut self) -> Result<u32> {
        let word = self.peek()?;
        self.pos += 1;
        Ok(word)
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        let end = self.pos.checked_add(count).filter(|&e| e <= self.words.len());
        match end {
            Some(end) => {
                self.pos = end;
                Ok(())
            }
            None => Err(DecodeError::Truncated { offset: self.words.len() }),
        }
    }

    /// Jump to an absolute word position at or before the end of the stream.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.words.len() {
            return Err(DecodeError::Truncated { offset: self.words.len() });
        }
        self.pos = pos;
        Ok(())
    }

    /// Borrow `count` words from the current position without consuming them.
    pub fn peek_slice(&self, count: usize) -> Result<&'a [u32]> {
        self.words
            .get(self.pos..self.pos + count)
            .ok_or(DecodeError::Truncated { offset: self.words.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_are_bounds_checked() {
        let words = [1, 2, 3];
        let mut cursor = TokenCursor::new(&words);
        assert_eq!(cursor.read(), Ok(1));
        assert_eq!(cursor.peek(), Ok(2));
        cursor.skip(2).unwrap();
        assert!(cursor.at_end());
        assert_eq!(cursor.read(), Err(DecodeError::Truncated { offset: 3 }));
        assert!(cursor.skip(1).is_err());
    }
}
