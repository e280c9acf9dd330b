//! protocol-hpack - HPACK (RFC 7541) header compression for HTTP/2.
//!
//! HPACK translates a list of header fields into a compact octet stream and
//! back, maintaining a bounded dynamic table of recently transmitted
//! name/value pairs so that repeated headers can be sent as a small index
//! instead of a literal. Encoder and decoder each hold one table per
//! connection direction and must stay byte-exact mirrors of each other.
//!
//! # Features
//!
//! - Prefix integer coding with continuation bytes (Section 5.1)
//! - Canonical Huffman string coding (Section 5.2, Appendix B)
//! - The 61-entry static table and a capacity-bounded dynamic table with
//!   FIFO eviction (Section 4)
//! - All header field representations, including dynamic table size updates
//!   with their ordering rules (Section 6)
//!
//! # Architecture
//!
//! - `integer`: prefix integer encode/decode
//! - `huffman`: canonical Huffman encode/decode
//! - `field`: header fields and their requested encode types
//! - `table`: the static table and the dynamic table arena
//! - `codec`: the stateful encoder/decoder driving the above
//! - `buffer`: the octet reader/writer the codec operates on
//!
//! # Example
//!
//! ```
//! use protocol_hpack::{EncodeType, Header, HpackCodec, Reader, Writer};
//!
//! let mut encoder = HpackCodec::new();
//! let mut decoder = HpackCodec::new();
//!
//! let headers = vec![Header::new(":method", "GET", EncodeType::Indexed)];
//!
//! let mut writer = Writer::new();
//! encoder.encode(&mut writer, &headers).unwrap();
//! assert_eq!(writer.as_slice(), &[0x82]);
//!
//! let mut reader = Reader::new(writer.as_slice());
//! let decoded = decoder.decode(&mut reader).unwrap();
//! assert_eq!(decoded, headers);
//! ```

pub mod buffer;
pub mod codec;
pub mod error;
pub mod field;
pub mod huffman;
pub mod integer;
pub mod table;

pub use buffer::{Reader, Writer};
pub use codec::HpackCodec;
pub use error::{Error, ErrorKind};
pub use field::{EncodeType, Header};

/// Default dynamic table capacity in bytes (64 KiB).
pub const DEFAULT_CAPACITY: u32 = 0x0001_0000;

/// Largest capacity a size update may request (SETTINGS_HEADER_TABLE_SIZE).
pub const HEADER_TABLE_LIMIT: u32 = 0x8000_0000;

/// Per-entry overhead charged against the table capacity (RFC 7541
/// Section 4.1).
pub const ENTRY_OVERHEAD: u32 = 32;

/// Number of entries in the static table, counting the unused index 0.
pub const STATIC_TABLE_LEN: u32 = 62;
