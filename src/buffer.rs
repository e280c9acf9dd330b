//! Octet reader and writer for header blocks.
//!
//! The codec never touches I/O directly: it pulls octets from a [`Reader`]
//! positioned over one complete header block and pushes octets into a
//! [`Writer`]. Both are plain in-memory cursors; any asynchronous transport
//! concerns live outside this crate.

use crate::error::Error;

/// A sequential, non-destructive cursor over a borrowed header block.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Look at the next octet without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Consume and return the next octet.
    ///
    /// Running off the end of a header block means the peer sent a
    /// truncated representation, so exhaustion is a protocol error.
    pub fn get(&mut self) -> Result<u8, Error> {
        let octet = *self.data.get(self.pos).ok_or(Error::Truncated)?;
        self.pos += 1;
        Ok(octet)
    }

    /// Consume the next `len` octets as a slice.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if len > self.remaining() {
            return Err(Error::Truncated);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// Number of octets consumed so far.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of unread octets.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// A fresh reader over the same block, positioned at offset 0.
    ///
    /// Used to re-scan the head of the block when validating size update
    /// ordering.
    pub fn rewound(&self) -> Reader<'a> {
        Reader::new(self.data)
    }
}

/// An append-only octet sink backed by an owned buffer.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one octet.
    pub fn put(&mut self, octet: u8) {
        self.buf.push(octet);
    }

    /// Append a run of octets.
    pub fn write(&mut self, octets: &[u8]) {
        self.buf.extend_from_slice(octets);
    }

    /// Number of octets written so far.
    pub fn used(&self) -> usize {
        self.buf.len()
    }

    /// View the octets written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Take ownership of the written octets.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Discard everything written so far.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_peek_get() {
        let mut reader = Reader::new(&[0x82, 0x86]);
        assert_eq!(reader.peek(), Some(0x82));
        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.get().unwrap(), 0x82);
        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.get().unwrap(), 0x86);
        assert_eq!(reader.peek(), None);
        assert!(matches!(reader.get(), Err(Error::Truncated)));
    }

    #[test]
    fn test_reader_take() {
        let mut reader = Reader::new(b"abcdef");
        assert_eq!(reader.take(3).unwrap(), b"abc");
        assert_eq!(reader.remaining(), 3);
        assert!(matches!(reader.take(4), Err(Error::Truncated)));
        assert_eq!(reader.take(3).unwrap(), b"def");
    }

    #[test]
    fn test_reader_rewound() {
        let mut reader = Reader::new(&[1, 2, 3]);
        reader.get().unwrap();
        reader.get().unwrap();
        let aux = reader.rewound();
        assert_eq!(aux.offset(), 0);
        assert_eq!(aux.peek(), Some(1));
        // The original cursor is unaffected.
        assert_eq!(reader.offset(), 2);
    }

    #[test]
    fn test_writer() {
        let mut writer = Writer::new();
        writer.put(0x40);
        writer.write(b"key");
        assert_eq!(writer.used(), 4);
        assert_eq!(writer.as_slice(), b"\x40key");
        writer.reset();
        assert_eq!(writer.used(), 0);
    }
}
