//! Delimited-token scanner shared by both text decoders.
//!
//! The scanner walks a raw byte buffer once, slicing out one token at a time.
//! A token ends at a field delimiter, a point delimiter, or the end of the
//! buffer. Runs of repeated field delimiters collapse into one; a run that
//! reaches a point delimiter (or the end of the buffer) is a trailing
//! delimiter and ends the token as if the field delimiters were absent.

/// What terminated a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Another reading follows on the same row.
    Field,
    /// The row (point) is complete.
    Point,
    /// The buffer is exhausted.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteClass {
    Data,
    Field,
    Point,
}

/// Byte classification table for the two delimiter classes.
#[derive(Debug, Clone)]
pub struct DelimiterSet {
    table: [ByteClass; 256],
}

impl DelimiterSet {
    /// Build a set from field and point delimiter bytes.
    ///
    /// A byte listed in both classes is treated as a point delimiter.
    pub fn new(field: &[u8], point: &[u8]) -> Self {
        let mut table = [ByteClass::Data; 256];
        for &b in field {
            table[b as usize] = ByteClass::Field;
        }
        for &b in point {
            table[b as usize] = ByteClass::Point;
        }
        Self { table }
    }

    #[inline]
    pub fn is_field(&self, byte: u8) -> bool {
        self.table[byte as usize] == ByteClass::Field
    }

    #[inline]
    pub fn is_point(&self, byte: u8) -> bool {
        self.table[byte as usize] == ByteClass::Point
    }

    #[inline]
    fn is_data(&self, byte: u8) -> bool {
        self.table[byte as usize] == ByteClass::Data
    }
}

impl Default for DelimiterSet {
    /// Comma-separated readings, newline-separated points.
    fn default() -> Self {
        Self::new(b",", b"\n")
    }
}

/// One numeric token sliced out of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Raw token bytes, untrimmed.
    pub bytes: &'a [u8],
    /// Byte offset of the token start within the scanned buffer.
    pub offset: usize,
    /// Delimiter that ended the token.
    pub delimiter: Delimiter,
}

impl<'a> Token<'a> {
    /// Token bytes with surrounding ASCII whitespace removed.
    #[inline]
    pub fn trimmed(&self) -> &'a [u8] {
        self.bytes.trim_ascii()
    }

    /// True when the token carries no characters besides whitespace.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

/// Read position into an immutable byte buffer.
///
/// Lives for the duration of one decode call.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Start of the most recently emitted token.
    boundary: usize,
    done: bool,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            boundary: 0,
            done: false,
        }
    }

    /// Current scan position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Start offset of the last token handed out.
    #[inline]
    pub fn boundary(&self) -> usize {
        self.boundary
    }

    /// Slice out the next token.
    ///
    /// Returns `None` once a token terminated by [`Delimiter::End`] has been
    /// emitted. An empty buffer yields exactly one empty `End` token.
    pub fn next_token(&mut self, delimiters: &DelimiterSet) -> Option<Token<'a>> {
        if self.done {
            return None;
        }

        let bytes = self.bytes;
        let len = bytes.len();
        let start = self.pos;
        self.boundary = start;

        while self.pos < len && delimiters.is_data(bytes[self.pos]) {
            self.pos += 1;
        }
        let end = self.pos;

        let delimiter = if self.pos == len {
            Delimiter::End
        } else if delimiters.is_point(bytes[self.pos]) {
            self.pos += 1;
            Delimiter::Point
        } else {
            // Collapse repeated field delimiters
            while self.pos < len && delimiters.is_field(bytes[self.pos]) {
                self.pos += 1;
            }
            if self.pos == len {
                Delimiter::End
            } else if delimiters.is_point(bytes[self.pos]) {
                self.pos += 1;
                Delimiter::Point
            } else {
                Delimiter::Field
            }
        };

        if delimiter == Delimiter::End {
            self.done = true;
        }

        Some(Token {
            bytes: &bytes[start..end],
            offset: start,
            delimiter,
        })
    }

    /// Consume the cursor as an iterator over its remaining tokens.
    pub fn tokens<'d>(self, delimiters: &'d DelimiterSet) -> Tokens<'a, 'd> {
        Tokens {
            cursor: self,
            delimiters,
        }
    }
}

/// Iterator adapter over [`ByteCursor::next_token`].
pub struct Tokens<'a, 'd> {
    cursor: ByteCursor<'a>,
    delimiters: &'d DelimiterSet,
}

impl<'a> Iterator for Tokens<'a, '_> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_token(self.delimiters)
    }
}
