//! Static and dynamic indexing tables (RFC 7541 Sections 2.3 and 4).
//!
//! Wire indices are one address space: 1..=61 name the static table,
//! 62 and up name dynamic entries from newest to oldest. The dynamic
//! table stores entries in a fixed circular arena of `capacity / 32`
//! slots, the most slots a conforming table can ever hold, so an insert
//! never moves existing entries. Logical positions are recovered from
//! the physical slot with modular arithmetic.

use std::collections::HashMap;

use log::trace;

use crate::error::Error;
use crate::{ENTRY_OVERHEAD, HEADER_TABLE_LIMIT, STATIC_TABLE_LEN};

/// The static table (RFC 7541 Appendix A). Index 0 is unused, indices
/// are 1-based on the wire.
const STATIC_ENTRIES: [(&[u8], &[u8]); STATIC_TABLE_LEN as usize] = [
    (b"", b""),
    (b":authority", b""),
    (b":method", b"GET"),
    (b":method", b"POST"),
    (b":path", b"/"),
    (b":path", b"/index.html"),
    (b":scheme", b"http"),
    (b":scheme", b"https"),
    (b":status", b"200"),
    (b":status", b"204"),
    (b":status", b"206"),
    (b":status", b"304"),
    (b":status", b"400"),
    (b":status", b"404"),
    (b":status", b"500"),
    (b"accept-charset", b""),
    (b"accept-encoding", b"gzip, deflate"),
    (b"accept-language", b""),
    (b"accept-ranges", b""),
    (b"accept", b""),
    (b"access-control-allow-origin", b""),
    (b"age", b""),
    (b"allow", b""),
    (b"authorization", b""),
    (b"cache-control", b""),
    (b"content-disposition", b""),
    (b"content-encoding", b""),
    (b"content-language", b""),
    (b"content-length", b""),
    (b"content-location", b""),
    (b"content-range", b""),
    (b"content-type", b""),
    (b"cookie", b""),
    (b"date", b""),
    (b"etag", b""),
    (b"expect", b""),
    (b"expires", b""),
    (b"from", b""),
    (b"host", b""),
    (b"if-match", b""),
    (b"if-modified-since", b""),
    (b"if-none-match", b""),
    (b"if-range", b""),
    (b"if-unmodified-since", b""),
    (b"last-modified", b""),
    (b"link", b""),
    (b"location", b""),
    (b"max-forwards", b""),
    (b"proxy-authenticate", b""),
    (b"proxy-authorization", b""),
    (b"range", b""),
    (b"referer", b""),
    (b"refresh", b""),
    (b"retry-after", b""),
    (b"server", b""),
    (b"set-cookie", b""),
    (b"strict-transport-security", b""),
    (b"transfer-encoding", b""),
    (b"user-agent", b""),
    (b"vary", b""),
    (b"via", b""),
    (b"www-authenticate", b""),
];

/// Read-only access to the static table.
pub struct StaticTable;

impl StaticTable {
    /// Look up a static entry by wire index (1..=61).
    pub fn get(index: u32) -> Option<(&'static [u8], &'static [u8])> {
        if index == 0 || index >= STATIC_TABLE_LEN {
            return None;
        }
        Some(STATIC_ENTRIES[index as usize])
    }

    /// Find `name`/`value` in the static table.
    ///
    /// Returns the lowest matching wire index and whether the value
    /// matched too. An exact match wins over a name-only match.
    pub fn find(name: &[u8], value: &[u8]) -> Option<(u32, bool)> {
        let mut name_only = None;
        for (index, &(n, v)) in STATIC_ENTRIES.iter().enumerate().skip(1) {
            if n != name {
                continue;
            }
            if v == value {
                return Some((index as u32, true));
            }
            if name_only.is_none() {
                name_only = Some((index as u32, false));
            }
        }
        name_only
    }
}

/// A dynamic table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

impl Entry {
    /// Size charged against the table capacity (RFC 7541 Section 4.1).
    fn size(&self) -> u64 {
        (self.name.len() + self.value.len()) as u64 + u64::from(ENTRY_OVERHEAD)
    }
}

/// Name to occupied physical slots. Kept alongside the arena so encoder
/// lookups never scan the slot array.
#[derive(Debug, Default)]
struct NameIndex {
    map: HashMap<Vec<u8>, Vec<u32>>,
}

impl NameIndex {
    fn insert(&mut self, name: &[u8], slot: u32) {
        self.map.entry(name.to_vec()).or_default().push(slot);
    }

    fn remove(&mut self, name: &[u8], slot: u32) -> Result<(), Error> {
        let slots = self
            .map
            .get_mut(name)
            .ok_or(Error::Consistency("name missing from index"))?;
        let at = slots
            .iter()
            .position(|&s| s == slot)
            .ok_or(Error::Consistency("slot missing from index"))?;
        slots.swap_remove(at);
        if slots.is_empty() {
            self.map.remove(name);
        }
        Ok(())
    }

    fn slots(&self, name: &[u8]) -> &[u32] {
        self.map.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn clear(&mut self) {
        self.map.clear();
    }
}

/// The dynamic table (RFC 7541 Section 2.3.2).
///
/// Entries live in a circular arena of 1-based slots. `ins` is the slot
/// the next insert takes, `old` the slot of the oldest live entry; both
/// wrap immediately on advance. Size accounting is in bytes with the
/// 32-byte per-entry overhead included.
#[derive(Debug)]
pub struct DynamicTable {
    capacity: u32,
    slots: Vec<Option<Entry>>,
    used: u32,
    size: u64,
    ins: u32,
    old: u32,
    index: NameIndex,
}

impl DynamicTable {
    /// Create a table with the given capacity in bytes. The arena is
    /// allocated up front for `capacity / 32` entries.
    pub fn with_capacity(capacity: u32) -> Self {
        let count = (capacity / ENTRY_OVERHEAD) as usize;
        let mut slots = Vec::new();
        slots.resize_with(count, || None);
        Self {
            capacity,
            slots,
            used: 0,
            size: 0,
            ins: 1,
            old: 1,
            index: NameIndex::default(),
        }
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes in use, per-entry overhead included.
    pub fn used_bytes(&self) -> u64 {
        self.size
    }

    /// Number of live entries.
    pub fn len(&self) -> u32 {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Physical slot of the entry at logical position `dynam` (0 is the
    /// newest entry).
    fn slot_of(&self, dynam: u32) -> u32 {
        let n = i64::from(self.slot_count());
        let s = (i64::from(self.ins) - 2 - i64::from(dynam)).rem_euclid(n);
        s as u32 + 1
    }

    /// Logical position of the entry in physical slot `slot`.
    fn dynam_of(&self, slot: u32) -> u32 {
        let n = i64::from(self.slot_count());
        (i64::from(self.ins) - 1 - i64::from(slot)).rem_euclid(n) as u32
    }

    /// Look up the entry at logical position `dynam`.
    ///
    /// The slot and logical position are cross-checked on every access;
    /// a mismatch means the arena bookkeeping is corrupt.
    pub fn entry(&self, dynam: u32) -> Result<(&[u8], &[u8]), Error> {
        if dynam >= self.used {
            return Err(Error::InvalidIndex(dynam + STATIC_TABLE_LEN));
        }
        let slot = self.slot_of(dynam);
        if self.dynam_of(slot) != dynam {
            return Err(Error::Consistency("slot round-trip mismatch"));
        }
        match &self.slots[slot as usize - 1] {
            Some(entry) => Ok((&entry.name, &entry.value)),
            None => Err(Error::Consistency("empty slot in live window")),
        }
    }

    /// Find an exact name/value match, returning its logical position.
    pub fn find_exact(&self, name: &[u8], value: &[u8]) -> Option<u32> {
        self.index
            .slots(name)
            .iter()
            .filter(|&&slot| {
                self.slots[slot as usize - 1]
                    .as_ref()
                    .is_some_and(|e| e.value == value)
            })
            .map(|&slot| self.dynam_of(slot))
            .min()
    }

    /// Find a name-only match, returning the logical position of the
    /// newest entry with that name.
    pub fn find_name(&self, name: &[u8]) -> Option<u32> {
        self.index
            .slots(name)
            .iter()
            .map(|&slot| self.dynam_of(slot))
            .min()
    }

    /// Insert an entry, evicting from the oldest end until it fits.
    ///
    /// An entry larger than the whole table empties it and is then
    /// dropped; the evictions stand (RFC 7541 Section 4.4).
    pub fn insert(&mut self, name: &[u8], value: &[u8]) -> Result<(), Error> {
        let need = (name.len() + value.len()) as u64 + u64::from(ENTRY_OVERHEAD);
        while self.used > 0 && self.size + need > u64::from(self.capacity) {
            self.remove_oldest()?;
        }
        if need > u64::from(self.capacity) {
            trace!("dropping oversized entry: {} bytes", need);
            return Ok(());
        }

        let slot = self.ins;
        let at = slot as usize - 1;
        if self.slots[at].is_some() {
            return Err(Error::Consistency("insert slot occupied"));
        }
        self.slots[at] = Some(Entry {
            name: name.to_vec(),
            value: value.to_vec(),
        });
        self.index.insert(name, slot);
        self.ins = self.ins % self.slot_count() + 1;
        self.used += 1;
        self.size += need;
        trace!("inserted entry at slot {}, {} bytes used", slot, self.size);
        Ok(())
    }

    /// Evict the oldest entry.
    fn remove_oldest(&mut self) -> Result<(), Error> {
        if self.used == 0 {
            return Err(Error::Consistency("evict from empty table"));
        }
        let slot = self.old;
        let entry = self.slots[slot as usize - 1]
            .take()
            .ok_or(Error::Consistency("oldest slot empty"))?;
        self.index.remove(&entry.name, slot)?;
        self.old = self.old % self.slot_count() + 1;
        self.used -= 1;
        self.size -= entry.size();
        if self.used == 0 {
            self.ins = 1;
            self.old = 1;
        }
        trace!("evicted entry from slot {}, {} bytes used", slot, self.size);
        Ok(())
    }

    /// Change the table capacity.
    ///
    /// Entries are evicted from the oldest end until the survivors fit
    /// the new budget, then the arena is reallocated and the survivors
    /// renumbered into slots 1..=len, oldest first. Logical positions
    /// are unaffected.
    pub fn set_capacity(&mut self, size: u32) -> Result<(), Error> {
        if size > HEADER_TABLE_LIMIT {
            return Err(Error::ResizeLimit(size));
        }
        while self.size > u64::from(size) {
            self.remove_oldest()?;
        }

        // The requested size is peer controlled; a huge update must fail
        // cleanly instead of aborting on allocation.
        let count = (size / ENTRY_OVERHEAD) as usize;
        let mut slots: Vec<Option<Entry>> = Vec::new();
        slots
            .try_reserve_exact(count)
            .map_err(|_| Error::TableOverflow)?;
        slots.resize_with(count, || None);
        for i in 0..self.used {
            let dynam = self.used - 1 - i;
            let from = self.slot_of(dynam) as usize - 1;
            let entry = self.slots[from]
                .take()
                .ok_or(Error::Consistency("relocation source empty"))?;
            slots[i as usize] = Some(entry);
        }

        self.capacity = size;
        self.slots = slots;
        self.old = 1;
        self.ins = match self.slot_count() {
            0 => 1,
            n => self.used % n + 1,
        };
        self.index.clear();
        for slot in 1..=self.used {
            if let Some(entry) = &self.slots[slot as usize - 1] {
                let name = entry.name.clone();
                self.index.insert(&name, slot);
            }
        }
        trace!(
            "resized table to {} bytes, {} entries retained",
            size,
            self.used
        );
        Ok(())
    }

    /// Drop every entry, keeping the capacity.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.index.clear();
        self.used = 0;
        self.size = 0;
        self.ins = 1;
        self.old = 1;
    }
}

/// Tables are equal when their capacity and live entries agree in
/// logical order; the physical arena layout is irrelevant.
impl PartialEq for DynamicTable {
    fn eq(&self, other: &Self) -> bool {
        if self.capacity != other.capacity
            || self.used != other.used
            || self.size != other.size
        {
            return false;
        }
        (0..self.used).all(|dynam| {
            match (self.entry(dynam), other.entry(dynam)) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        })
    }
}

impl Eq for DynamicTable {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_get() {
        assert_eq!(StaticTable::get(0), None);
        assert_eq!(StaticTable::get(62), None);
        assert_eq!(StaticTable::get(1), Some((&b":authority"[..], &b""[..])));
        assert_eq!(StaticTable::get(2), Some((&b":method"[..], &b"GET"[..])));
        assert_eq!(
            StaticTable::get(61),
            Some((&b"www-authenticate"[..], &b""[..]))
        );
    }

    #[test]
    fn test_static_find() {
        assert_eq!(StaticTable::find(b":method", b"GET"), Some((2, true)));
        assert_eq!(StaticTable::find(b":method", b"POST"), Some((3, true)));
        // Name-only match reports the lowest index for that name.
        assert_eq!(StaticTable::find(b":method", b"PUT"), Some((2, false)));
        assert_eq!(StaticTable::find(b":status", b"307"), Some((8, false)));
        assert_eq!(StaticTable::find(b"x-missing", b""), None);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = DynamicTable::with_capacity(256);
        table.insert(b"custom-key", b"custom-header").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.used_bytes(), 55);
        assert_eq!(
            table.entry(0).unwrap(),
            (&b"custom-key"[..], &b"custom-header"[..])
        );
        assert_eq!(table.entry(1), Err(Error::InvalidIndex(63)));
    }

    #[test]
    fn test_newest_is_logical_zero() {
        let mut table = DynamicTable::with_capacity(4096);
        table.insert(b"a", b"1").unwrap();
        table.insert(b"b", b"2").unwrap();
        table.insert(b"c", b"3").unwrap();
        assert_eq!(table.entry(0).unwrap(), (&b"c"[..], &b"3"[..]));
        assert_eq!(table.entry(1).unwrap(), (&b"b"[..], &b"2"[..]));
        assert_eq!(table.entry(2).unwrap(), (&b"a"[..], &b"1"[..]));
    }

    #[test]
    fn test_eviction_is_fifo() {
        // Room for exactly two 34-byte entries.
        let mut table = DynamicTable::with_capacity(68);
        table.insert(b"a", b"1").unwrap();
        table.insert(b"b", b"2").unwrap();
        table.insert(b"c", b"3").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry(0).unwrap(), (&b"c"[..], &b"3"[..]));
        assert_eq!(table.entry(1).unwrap(), (&b"b"[..], &b"2"[..]));
    }

    #[test]
    fn test_arena_wraps() {
        // Three slots; five inserts exercise the wrap twice.
        let mut table = DynamicTable::with_capacity(96);
        for (name, value) in [
            (&b"a"[..], &b"1"[..]),
            (&b"b"[..], &b"2"[..]),
            (&b"c"[..], &b"3"[..]),
            (&b"d"[..], &b"4"[..]),
            (&b"e"[..], &b"5"[..]),
        ] {
            table.insert(name, value).unwrap();
        }
        // 34 * 3 > 96, so only two entries survive each insert.
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry(0).unwrap(), (&b"e"[..], &b"5"[..]));
        assert_eq!(table.entry(1).unwrap(), (&b"d"[..], &b"4"[..]));
    }

    #[test]
    fn test_oversized_entry_dropped_after_eviction() {
        let mut table = DynamicTable::with_capacity(68);
        table.insert(b"a", b"1").unwrap();
        let big = vec![b'x'; 100];
        table.insert(b"huge", &big).unwrap();
        assert_eq!(table.len(), 0);
        assert_eq!(table.used_bytes(), 0);
    }

    #[test]
    fn test_find_prefers_newest() {
        let mut table = DynamicTable::with_capacity(4096);
        table.insert(b"k", b"old").unwrap();
        table.insert(b"k", b"new").unwrap();
        assert_eq!(table.find_name(b"k"), Some(0));
        assert_eq!(table.find_exact(b"k", b"old"), Some(1));
        assert_eq!(table.find_exact(b"k", b"new"), Some(0));
        assert_eq!(table.find_exact(b"k", b"other"), None);
        assert_eq!(table.find_name(b"absent"), None);
    }

    #[test]
    fn test_resize_shrink_evicts_oldest() {
        let mut table = DynamicTable::with_capacity(4096);
        table.insert(b"a", b"1").unwrap();
        table.insert(b"b", b"2").unwrap();
        table.insert(b"c", b"3").unwrap();
        table.set_capacity(68).unwrap();
        assert_eq!(table.capacity(), 68);
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry(0).unwrap(), (&b"c"[..], &b"3"[..]));
        assert_eq!(table.entry(1).unwrap(), (&b"b"[..], &b"2"[..]));
        // Lookups still work through the relocated arena.
        assert_eq!(table.find_exact(b"c", b"3"), Some(0));
        assert_eq!(table.find_name(b"a"), None);
    }

    #[test]
    fn test_resize_to_zero_empties_table() {
        let mut table = DynamicTable::with_capacity(4096);
        table.insert(b"a", b"1").unwrap();
        table.set_capacity(0).unwrap();
        assert_eq!(table.len(), 0);
        assert_eq!(table.used_bytes(), 0);
        // Inserts are silently dropped while the capacity is zero.
        table.insert(b"b", b"2").unwrap();
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_resize_grow_preserves_entries() {
        let mut table = DynamicTable::with_capacity(68);
        table.insert(b"a", b"1").unwrap();
        table.insert(b"b", b"2").unwrap();
        table.set_capacity(4096).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.entry(0).unwrap(), (&b"b"[..], &b"2"[..]));
        assert_eq!(table.entry(1).unwrap(), (&b"a"[..], &b"1"[..]));
        table.insert(b"c", b"3").unwrap();
        assert_eq!(table.entry(0).unwrap(), (&b"c"[..], &b"3"[..]));
    }

    #[test]
    fn test_resize_limit() {
        let mut table = DynamicTable::with_capacity(4096);
        assert_eq!(
            table.set_capacity(HEADER_TABLE_LIMIT + 1),
            Err(Error::ResizeLimit(HEADER_TABLE_LIMIT + 1))
        );
    }

    #[test]
    fn test_clear() {
        let mut table = DynamicTable::with_capacity(4096);
        table.insert(b"a", b"1").unwrap();
        table.clear();
        assert_eq!(table.len(), 0);
        assert_eq!(table.used_bytes(), 0);
        assert_eq!(table.capacity(), 4096);
        table.insert(b"b", b"2").unwrap();
        assert_eq!(table.entry(0).unwrap(), (&b"b"[..], &b"2"[..]));
    }

    #[test]
    fn test_table_equality_ignores_layout() {
        let mut a = DynamicTable::with_capacity(96);
        let mut b = DynamicTable::with_capacity(96);
        // Drive `a` around the wrap so its physical layout differs.
        a.insert(b"x", b"0").unwrap();
        a.insert(b"y", b"0").unwrap();
        for table in [&mut a, &mut b] {
            table.insert(b"k1", b"v1").unwrap();
            table.insert(b"k2", b"v2").unwrap();
        }
        // 96 bytes holds two 36-byte entries; the fillers are gone.
        assert_eq!(a, b);
        b.insert(b"k3", b"v3").unwrap();
        assert_ne!(a, b);
    }
}
