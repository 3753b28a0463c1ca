//! SFNT offset table and table directory: the envelope shared by TrueType
//! and OpenType (`spec.md` §3, §4.2).

pub mod loader;
pub mod writer;

use nom::{be_u16, be_u32};

use crate::error::ParserError;
use crate::{checksum, Tag};

pub const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
/// Apple's `'true'` signature. A constant named `SFNT_VERSION_TRUE` in the
/// original toolkit this crate's behavior is grounded on carried a typo
/// (`0x74727965`, "truy"); the correct four bytes are `'true'`
/// (`spec.md` "Open questions").
pub const SFNT_VERSION_TRUE: u32 = 0x7472_7565;
pub const SFNT_VERSION_OTTO: u32 = 0x4f54_544f;

/// `{sfnt_version, num_tables, search_range, entry_selector, range_shift}`,
/// 12 bytes big-endian (`spec.md` §3, §6).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    pub sfnt_version: u32,
    pub num_tables: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl OffsetTable {
    /// Build an offset table with search-range fields freshly derived from
    /// `num_tables`, as the writer must (`spec.md` §3: "on write, \[they\]
    /// are recomputed, never copied").
    pub fn new(sfnt_version: u32, num_tables: u16) -> Self {
        let (entry_selector, search_range, range_shift) = checksum::search_params(num_tables);
        OffsetTable {
            sfnt_version,
            num_tables,
            search_range,
            entry_selector,
            range_shift,
        }
    }

    pub fn is_cff_flavored(&self) -> bool {
        self.sfnt_version == SFNT_VERSION_OTTO
    }

    pub fn is_truetype_flavored(&self) -> bool {
        self.sfnt_version == SFNT_VERSION_TRUETYPE || self.sfnt_version == SFNT_VERSION_TRUE
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.sfnt_version.to_be_bytes());
        out[4..6].copy_from_slice(&self.num_tables.to_be_bytes());
        out[6..8].copy_from_slice(&self.search_range.to_be_bytes());
        out[8..10].copy_from_slice(&self.entry_selector.to_be_bytes());
        out[10..12].copy_from_slice(&self.range_shift.to_be_bytes());
        out
    }
}

/// One row of the table directory, 16 bytes big-endian (`spec.md` §3, §6).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd)]
pub struct TableDirectoryEntry {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl TableDirectoryEntry {
    /// On-disk footprint including 4-byte padding (`spec.md` §3).
    pub fn padded_length(&self) -> u32 {
        checksum::padded_len(self.length as usize) as u32
    }
}

named!(pub(crate) parse_offset_table<&[u8], OffsetTable>,
    do_parse!(
        sfnt_version: be_u32 >>
        num_tables: be_u16 >>
        search_range: be_u16 >>
        entry_selector: be_u16 >>
        range_shift: be_u16 >>
        (OffsetTable {
            sfnt_version,
            num_tables,
            search_range,
            entry_selector,
            range_shift,
        })
    )
);

named!(pub(crate) parse_table_directory_entry<&[u8], TableDirectoryEntry>,
    do_parse!(
        tag: count_fixed!(u8, nom::be_u8, 4) >>
        checksum: be_u32 >>
        offset: be_u32 >>
        length: be_u32 >>
        (TableDirectoryEntry { tag: Tag(tag), checksum, offset, length })
    )
);

/// Parse the 12-byte offset table followed by `num_tables` 16-byte directory
/// entries, sorted by tag so lookups can binary search (the teacher's
/// `FontRecord` parser already sorts for this reason).
pub(crate) fn parse_font_header(
    input: &[u8],
) -> Result<(OffsetTable, Vec<TableDirectoryEntry>), ParserError> {
    let (rest, header) = parse_offset_table(input)?;
    let (_, mut entries) = count!(rest, parse_table_directory_entry, header.num_tables as usize)?;
    entries.sort_unstable_by_key(|e| e.tag);
    Ok((header, entries))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn offset_table_new_recomputes_search_params() {
        let t = OffsetTable::new(SFNT_VERSION_TRUETYPE, 12);
        assert_eq!(t.entry_selector, 3);
        assert_eq!(t.search_range, 128);
        assert_eq!(t.range_shift, 12 * 16 - 128);
    }

    #[test]
    fn parse_font_header_sorts_entries_by_tag() {
        let mut data = vec![];
        data.extend_from_slice(&SFNT_VERSION_TRUETYPE.to_be_bytes());
        data.extend_from_slice(&2u16.to_be_bytes()); // num_tables
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0]); // search params, unused on read
        // "name" entry then "head" entry, out of order on the wire
        data.extend_from_slice(b"name");
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"head");
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());

        let (header, entries) = parse_font_header(&data).unwrap();
        assert_eq!(header.num_tables, 2);
        assert_eq!(entries[0].tag, Tag::new('h', 'e', 'a', 'd'));
        assert_eq!(entries[1].tag, Tag::new('n', 'a', 'm', 'e'));
    }
}
