//! Header fields and their wire representations.
//!
//! Every header field representation is identified by its leading octet
//! (RFC 7541 Section 6). [`EncodeType`] names the eight cases plus the
//! dynamic table size update, and owns the first-octet classification and
//! the per-type prefix width and opcode stamp the integer codec needs.
//! [`Header`] is the caller-facing field: a name/value pair plus the
//! requested representation and per-string Huffman flags.

use crate::error::Error;

/// A header field representation, or the size update pseudo-operation.
///
/// The `*Literal` variants carry a literal name; their siblings reference
/// the name through a table index. The encoder downgrades a representation
/// to its literal sibling when the name is not indexed, so a requested
/// type is an intent, not a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeType {
    /// `1xxxxxxx` - name and value both referenced by index.
    Indexed,
    /// `01xxxxxx` - indexed name, literal value, entry added to the table.
    Insert,
    /// `01000000` - literal name and value, entry added to the table.
    InsertLiteral,
    /// `001xxxxx` - dynamic table size update.
    Resize,
    /// `0001xxxx` - indexed name, literal value, never indexed downstream.
    Never,
    /// `00010000` - literal name and value, never indexed downstream.
    NeverLiteral,
    /// `0000xxxx` - indexed name, literal value, not added to the table.
    Unindexed,
    /// `00000000` - literal name and value, not added to the table.
    UnindexedLiteral,
}

impl EncodeType {
    /// Classify a leading octet.
    ///
    /// The exact-stamp literal forms must be tested before the masked
    /// forms, and the masked forms in descending bit order; do not
    /// reorder. A lone `0x80` is the indexed representation with index 0,
    /// which RFC 7541 Section 6.1 forbids.
    pub fn from_octet(octet: u8) -> Result<Self, Error> {
        match octet {
            0x80 => return Err(Error::DisallowedOpcode),
            0x40 => return Ok(EncodeType::InsertLiteral),
            0x10 => return Ok(EncodeType::NeverLiteral),
            0x00 => return Ok(EncodeType::UnindexedLiteral),
            _ => {}
        }

        if octet & 0x80 != 0 {
            Ok(EncodeType::Indexed)
        } else if octet & 0x40 != 0 {
            Ok(EncodeType::Insert)
        } else if octet & 0x20 != 0 {
            Ok(EncodeType::Resize)
        } else if octet & 0x10 != 0 {
            Ok(EncodeType::Never)
        } else {
            Ok(EncodeType::Unindexed)
        }
    }

    /// Width of the index prefix in the first octet.
    ///
    /// The literal-name forms carry no index; their prefix width is 0.
    pub fn prefix_bits(self) -> u8 {
        match self {
            EncodeType::Indexed => 7,
            EncodeType::Insert => 6,
            EncodeType::Resize => 5,
            EncodeType::Never | EncodeType::Unindexed => 4,
            EncodeType::InsertLiteral
            | EncodeType::NeverLiteral
            | EncodeType::UnindexedLiteral => 0,
        }
    }

    /// Opcode bits stamped into the first octet.
    pub fn stamp(self) -> u8 {
        match self {
            EncodeType::Indexed => 0x80,
            EncodeType::Insert | EncodeType::InsertLiteral => 0x40,
            EncodeType::Resize => 0x20,
            EncodeType::Never | EncodeType::NeverLiteral => 0x10,
            EncodeType::Unindexed | EncodeType::UnindexedLiteral => 0x00,
        }
    }

    /// The literal-name sibling this type downgrades to when the name is
    /// not indexed.
    pub(crate) fn literal_sibling(self) -> Self {
        match self {
            EncodeType::Indexed | EncodeType::Insert | EncodeType::InsertLiteral => {
                EncodeType::InsertLiteral
            }
            EncodeType::Never | EncodeType::NeverLiteral => EncodeType::NeverLiteral,
            EncodeType::Unindexed | EncodeType::UnindexedLiteral => {
                EncodeType::UnindexedLiteral
            }
            EncodeType::Resize => EncodeType::Resize,
        }
    }
}

/// A header field with its requested encoding.
///
/// `encode_type` and the Huffman flags describe how the caller would like
/// the field transmitted; the codec may substitute a legal literal form.
/// Equality compares only name and value, so a decoded list compares equal
/// to the list that produced it even when the actual representations
/// differ.
#[derive(Debug, Clone)]
pub struct Header {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    pub encode_type: EncodeType,
    pub name_huffman: bool,
    pub value_huffman: bool,
}

impl Header {
    /// Create a header with plain (non-Huffman) string literals.
    pub fn new(
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        encode_type: EncodeType,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            encode_type,
            name_huffman: false,
            value_huffman: false,
        }
    }

    /// Create a header with explicit Huffman flags for name and value.
    pub fn with_huffman(
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        encode_type: EncodeType,
        name_huffman: bool,
        value_huffman: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            encode_type,
            name_huffman,
            value_huffman,
        }
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl Eq for Header {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_exact_stamps() {
        assert!(matches!(
            EncodeType::from_octet(0x80),
            Err(Error::DisallowedOpcode)
        ));
        assert_eq!(
            EncodeType::from_octet(0x40).unwrap(),
            EncodeType::InsertLiteral
        );
        assert_eq!(
            EncodeType::from_octet(0x10).unwrap(),
            EncodeType::NeverLiteral
        );
        assert_eq!(
            EncodeType::from_octet(0x00).unwrap(),
            EncodeType::UnindexedLiteral
        );
    }

    #[test]
    fn test_classify_masked() {
        assert_eq!(EncodeType::from_octet(0x82).unwrap(), EncodeType::Indexed);
        assert_eq!(EncodeType::from_octet(0xff).unwrap(), EncodeType::Indexed);
        assert_eq!(EncodeType::from_octet(0x41).unwrap(), EncodeType::Insert);
        assert_eq!(EncodeType::from_octet(0x7f).unwrap(), EncodeType::Insert);
        assert_eq!(EncodeType::from_octet(0x20).unwrap(), EncodeType::Resize);
        assert_eq!(EncodeType::from_octet(0x3f).unwrap(), EncodeType::Resize);
        assert_eq!(EncodeType::from_octet(0x11).unwrap(), EncodeType::Never);
        assert_eq!(EncodeType::from_octet(0x1f).unwrap(), EncodeType::Never);
        assert_eq!(EncodeType::from_octet(0x01).unwrap(), EncodeType::Unindexed);
        assert_eq!(EncodeType::from_octet(0x0f).unwrap(), EncodeType::Unindexed);
    }

    #[test]
    fn test_prefix_tables() {
        assert_eq!(EncodeType::Indexed.prefix_bits(), 7);
        assert_eq!(EncodeType::Indexed.stamp(), 0x80);
        assert_eq!(EncodeType::Insert.prefix_bits(), 6);
        assert_eq!(EncodeType::Insert.stamp(), 0x40);
        assert_eq!(EncodeType::Resize.prefix_bits(), 5);
        assert_eq!(EncodeType::Resize.stamp(), 0x20);
        assert_eq!(EncodeType::Never.prefix_bits(), 4);
        assert_eq!(EncodeType::Never.stamp(), 0x10);
        assert_eq!(EncodeType::Unindexed.prefix_bits(), 4);
        assert_eq!(EncodeType::Unindexed.stamp(), 0x00);
        assert_eq!(EncodeType::InsertLiteral.stamp(), 0x40);
        assert_eq!(EncodeType::NeverLiteral.stamp(), 0x10);
        assert_eq!(EncodeType::UnindexedLiteral.stamp(), 0x00);
    }

    #[test]
    fn test_header_equality_ignores_representation() {
        let a = Header::new("x-key", "x-value", EncodeType::Indexed);
        let b = Header::with_huffman("x-key", "x-value", EncodeType::NeverLiteral, true, true);
        assert_eq!(a, b);

        let c = Header::new("x-key", "other", EncodeType::Indexed);
        assert_ne!(a, c);
    }
}
