//! The stateful encoder/decoder (RFC 7541 Sections 3 and 6).
//!
//! One [`HpackCodec`] holds the dynamic table for one direction of a
//! connection. Encoding and decoding are the two faces of the same state
//! machine: every representation that inserts into the table does so on
//! both sides, so a decoder fed an encoder's output ends up with an
//! identical table. [`PartialEq`] checks exactly that.
//!
//! The encoder treats a header's [`EncodeType`] as a request. An indexed
//! form is downgraded to a literal form when the table has no matching
//! entry, so callers can ask for maximum compression without knowing the
//! table state.

use log::{debug, trace};

use crate::buffer::{Reader, Writer};
use crate::error::Error;
use crate::field::{EncodeType, Header};
use crate::huffman;
use crate::integer;
use crate::table::{DynamicTable, StaticTable};
use crate::{DEFAULT_CAPACITY, STATIC_TABLE_LEN};

/// HPACK encoder/decoder with its dynamic table.
#[derive(Debug, PartialEq, Eq)]
pub struct HpackCodec {
    table: DynamicTable,
}

impl Default for HpackCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl HpackCodec {
    /// Create a codec with the default table capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a codec with the given dynamic table capacity in bytes.
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            table: DynamicTable::with_capacity(capacity),
        }
    }

    /// Dynamic table capacity in bytes.
    pub fn capacity(&self) -> u32 {
        self.table.capacity()
    }

    /// Dynamic table bytes in use, per-entry overhead included.
    pub fn used(&self) -> u64 {
        self.table.used_bytes()
    }

    /// Number of dynamic table entries.
    pub fn len(&self) -> u32 {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Look up a wire index in the combined address space: 1..=61 is the
    /// static table, 62 and up the dynamic table from newest to oldest.
    pub fn entry(&self, index: u32) -> Result<(&[u8], &[u8]), Error> {
        if index == 0 {
            return Err(Error::InvalidIndex(0));
        }
        if index < STATIC_TABLE_LEN {
            return StaticTable::get(index).ok_or(Error::InvalidIndex(index));
        }
        self.table.entry(index - STATIC_TABLE_LEN)
    }

    /// Change the table capacity without emitting a size update. For
    /// capacity changes driven by the local configuration, not the wire.
    pub fn set_capacity(&mut self, size: u32) -> Result<(), Error> {
        self.table.set_capacity(size)
    }

    /// Change the table capacity and emit a dynamic table size update
    /// into `writer`.
    ///
    /// Size updates must be the first representations of a header block,
    /// at most two of them, the second strictly larger. The octets
    /// already in `writer` are re-read to enforce this, so the writer
    /// must hold only the current block.
    pub fn resize(&mut self, writer: &mut Writer, size: u32) -> Result<(), Error> {
        let mut probe = Reader::new(writer.as_slice());
        let (count, prior) = scan_size_updates(&mut probe, writer.used())?;
        check_update_sequence(count, prior, size)?;
        self.table.set_capacity(size)?;
        integer::encode(writer, size, EncodeType::Resize.stamp(), 5);
        debug!("table resized to {} bytes", size);
        Ok(())
    }

    /// Drop every dynamic table entry, keeping the capacity.
    pub fn reset(&mut self) {
        self.table.clear();
    }

    /// Drop every dynamic table entry and set a new capacity.
    pub fn reset_with(&mut self, size: u32) -> Result<(), Error> {
        self.table.clear();
        self.table.set_capacity(size)
    }

    /// Encode a header list into `writer`.
    ///
    /// Size updates are not headers; a [`EncodeType::Resize`] entry in
    /// the list is refused. Use [`HpackCodec::resize`] before encoding.
    pub fn encode(&mut self, writer: &mut Writer, headers: &[Header]) -> Result<(), Error> {
        for header in headers {
            self.encode_one(writer, header)?;
        }
        trace!(
            "encoded {} headers into {} octets",
            headers.len(),
            writer.used()
        );
        Ok(())
    }

    fn encode_one(&mut self, writer: &mut Writer, header: &Header) -> Result<(), Error> {
        let resolved = match header.encode_type {
            EncodeType::Resize => return Err(Error::InvalidEncodeType),
            EncodeType::Indexed => match self.lookup(&header.name, &header.value) {
                Some((index, true)) => {
                    integer::encode(writer, index, EncodeType::Indexed.stamp(), 7);
                    return Ok(());
                }
                Some((index, false)) => {
                    // No full match; fall back to inserting under the
                    // indexed name so the next occurrence matches.
                    integer::encode(writer, index, EncodeType::Insert.stamp(), 6);
                    self.encode_string(writer, &header.value, header.value_huffman)?;
                    self.table.insert(&header.name, &header.value)?;
                    return Ok(());
                }
                None => EncodeType::InsertLiteral,
            },
            requested @ (EncodeType::Insert | EncodeType::Never | EncodeType::Unindexed) => {
                match self.lookup(&header.name, &header.value) {
                    Some((index, _)) => {
                        integer::encode(writer, index, requested.stamp(), requested.prefix_bits());
                        self.encode_string(writer, &header.value, header.value_huffman)?;
                        if requested == EncodeType::Insert {
                            self.table.insert(&header.name, &header.value)?;
                        }
                        return Ok(());
                    }
                    None => requested.literal_sibling(),
                }
            }
            literal => literal,
        };

        writer.put(resolved.stamp());
        self.encode_string(writer, &header.name, header.name_huffman)?;
        self.encode_string(writer, &header.value, header.value_huffman)?;
        if resolved == EncodeType::InsertLiteral {
            self.table.insert(&header.name, &header.value)?;
        }
        Ok(())
    }

    /// Decode a header block, consuming `reader` to its end.
    pub fn decode(&mut self, reader: &mut Reader<'_>) -> Result<Vec<Header>, Error> {
        let mut headers = Vec::new();
        while let Some(octet) = reader.peek() {
            let encode_type = EncodeType::from_octet(octet)?;
            match encode_type {
                EncodeType::Indexed => {
                    let index = integer::decode(reader, 7)?;
                    let (name, value) = self.entry(index)?;
                    headers.push(Header::new(name, value, EncodeType::Indexed));
                }
                EncodeType::Resize => {
                    let start = reader.offset();
                    let size = integer::decode(reader, 5)?;
                    let mut probe = reader.rewound();
                    let (count, prior) = scan_size_updates(&mut probe, start)?;
                    check_update_sequence(count, prior, size)?;
                    self.table.set_capacity(size)?;
                    debug!("peer resized table to {} bytes", size);
                }
                EncodeType::Insert | EncodeType::Never | EncodeType::Unindexed => {
                    let index = integer::decode(reader, encode_type.prefix_bits())?;
                    let name = self.entry(index)?.0.to_vec();
                    let (value, value_huffman) = self.decode_string(reader)?;
                    if encode_type == EncodeType::Insert {
                        self.table.insert(&name, &value)?;
                    }
                    headers.push(Header::with_huffman(
                        name,
                        value,
                        encode_type,
                        false,
                        value_huffman,
                    ));
                }
                EncodeType::InsertLiteral
                | EncodeType::NeverLiteral
                | EncodeType::UnindexedLiteral => {
                    reader.get()?;
                    let (name, name_huffman) = self.decode_string(reader)?;
                    let (value, value_huffman) = self.decode_string(reader)?;
                    if encode_type == EncodeType::InsertLiteral {
                        self.table.insert(&name, &value)?;
                    }
                    headers.push(Header::with_huffman(
                        name,
                        value,
                        encode_type,
                        name_huffman,
                        value_huffman,
                    ));
                }
            }
        }
        trace!("decoded {} headers", headers.len());
        Ok(headers)
    }

    /// Table lookup for the encoder. A static exact match wins, then a
    /// dynamic exact match, then a static name match, then a dynamic
    /// name match.
    fn lookup(&self, name: &[u8], value: &[u8]) -> Option<(u32, bool)> {
        let stat = StaticTable::find(name, value);
        if let Some((index, true)) = stat {
            return Some((index, true));
        }
        if let Some(dynam) = self.table.find_exact(name, value) {
            return Some((dynam + STATIC_TABLE_LEN, true));
        }
        if stat.is_some() {
            return stat;
        }
        self.table
            .find_name(name)
            .map(|dynam| (dynam + STATIC_TABLE_LEN, false))
    }

    fn encode_string(
        &self,
        writer: &mut Writer,
        data: &[u8],
        huffman: bool,
    ) -> Result<(), Error> {
        if huffman {
            let len = u32::try_from(huffman::encoded_len(data))
                .map_err(|_| Error::IntegerOverflow)?;
            integer::encode(writer, len, 0x80, 7);
            huffman::encode(writer, data);
        } else {
            let len = u32::try_from(data.len()).map_err(|_| Error::IntegerOverflow)?;
            integer::encode(writer, len, 0x00, 7);
            writer.write(data);
        }
        Ok(())
    }

    /// Decode a length-prefixed string, returning the octets and whether
    /// they were Huffman coded. The length is validated against the
    /// remaining input before anything is copied.
    fn decode_string(&self, reader: &mut Reader<'_>) -> Result<(Vec<u8>, bool), Error> {
        let huffman = match reader.peek() {
            Some(octet) => octet & 0x80 != 0,
            None => return Err(Error::Truncated),
        };
        let len = integer::decode(reader, 7)? as usize;
        let octets = reader.take(len)?;
        if huffman {
            Ok((huffman::decode(octets)?, true))
        } else {
            Ok((octets.to_vec(), false))
        }
    }
}

/// Re-read `probe` up to offset `end`, which must hold only dynamic
/// table size updates. Returns how many and the last size seen.
fn scan_size_updates(probe: &mut Reader<'_>, end: usize) -> Result<(u32, Option<u32>), Error> {
    let mut count = 0;
    let mut last = None;
    while probe.offset() < end {
        match probe.peek() {
            Some(octet) if octet & 0xe0 == 0x20 => {
                last = Some(integer::decode(probe, 5)?);
                count += 1;
            }
            _ => return Err(Error::ResizeOrder),
        }
    }
    Ok((count, last))
}

/// A block allows at most two size updates, and the second must grow
/// the first.
fn check_update_sequence(count: u32, prior: Option<u32>, size: u32) -> Result<(), Error> {
    if count >= 2 {
        return Err(Error::ResizeOrder);
    }
    if let Some(prior) = prior {
        if size <= prior {
            return Err(Error::ResizeOrder);
        }
    }
    Ok(())
}
