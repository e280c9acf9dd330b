//! HPACK error types.
//!
//! Errors carry a coarse [`ErrorKind`] so callers can tell the peer's
//! mistakes apart from our own. A `Protocol` error means the wire input was
//! malformed and the HTTP/2 connection must be torn down (RFC 7541
//! Section 2.3 treats decoding failures as connection errors). A
//! `Consistency` error means the table's own bookkeeping broke an
//! invariant, which is a bug in this implementation, never the peer's
//! fault. `Resource` covers allocation failure for the table backing store.

/// HPACK encoding or decoding error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lone `0x80` octet: indexed representation with index 0.
    #[error("disallowed encoding: 0x80")]
    DisallowedOpcode,
    /// The header block ended in the middle of a representation.
    #[error("truncated header block")]
    Truncated,
    /// A prefix integer does not fit in 32 bits.
    #[error("integer overflow")]
    IntegerOverflow,
    /// A Huffman bit sequence matches no code.
    #[error("invalid huffman code")]
    HuffmanCode,
    /// Huffman padding is not an EOS prefix (all one bits, at most 7).
    #[error("invalid huffman padding")]
    HuffmanFill,
    /// A table index addresses no live entry.
    #[error("invalid table index: {0}")]
    InvalidIndex(u32),
    /// A size update appeared after other representations, or a second
    /// update did not increase the first.
    #[error("size update out of sequence")]
    ResizeOrder,
    /// A size update exceeds SETTINGS_HEADER_TABLE_SIZE.
    #[error("size update exceeds limit: {0}")]
    ResizeLimit(u32),
    /// A header carried an encode type that cannot be emitted.
    #[error("invalid encode type for header")]
    InvalidEncodeType,
    /// Dynamic table bookkeeping violated an invariant.
    #[error("table consistency fault: {0}")]
    Consistency(&'static str),
    /// The table backing store could not be allocated.
    #[error("table allocation failed")]
    TableOverflow,
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed wire input; the connection must close.
    Protocol,
    /// Internal invariant violation; the table state cannot be trusted.
    Consistency,
    /// Allocation or budget exhaustion.
    Resource,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Consistency(_) => ErrorKind::Consistency,
            Error::TableOverflow => ErrorKind::Resource,
            _ => ErrorKind::Protocol,
        }
    }
}
