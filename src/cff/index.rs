//    Copyright 2018 Manuel Reinhardt
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

//! CFF INDEX reader/writer (`spec.md` §4.4.1-2): a variable-width container
//! of byte strings with 1-based cumulative offsets.

use std::rc::Rc;

use nom::{be_u16, be_u24, be_u32, be_u8};

use crate::error::ParserError;

/// A parsed INDEX. Holds onto the table's backing bytes and the byte range
/// its items live in, so `item(i)` slices without copying.
#[derive(Debug, Clone)]
pub struct Index {
    table: Rc<[u8]>,
    data_start: usize,
    offsets: Vec<u32>,
}

impl Default for Index {
    fn default() -> Self {
        Index {
            table: Rc::from(&[][..]),
            data_start: 0,
            offsets: vec![],
        }
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        (0..self.len()).all(|i| self.get(i) == other.get(i))
    }
}

impl Index {
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte slice for item `i`, or `None` if out of range. 1-based offsets:
    /// `item(i) = data[offsets[i]-1 .. offsets[i+1]-1]`.
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        let start = *self.offsets.get(i)? as usize - 1;
        let end = *self.offsets.get(i + 1)? as usize - 1;
        self.table.get(self.data_start + start..self.data_start + end)
    }

    /// Total size in bytes of this INDEX as it appears in the source table,
    /// counting the count field, off_size byte, offset array and item data.
    pub fn total_size(&self) -> usize {
        if self.offsets.is_empty() {
            return 2;
        }
        let last = *self.offsets.last().unwrap();
        let off_size = min_off_size(last);
        2 + 1 + self.offsets.len() * off_size as usize + (last as usize - 1)
    }

    /// Parse an INDEX starting at `start` within `table`'s bytes. Returns the
    /// parsed INDEX and the offset of the first byte following it.
    pub fn parse_from(table: &Rc<[u8]>, start: usize) -> Result<(Index, usize), ParserError> {
        let data = table.get(start..).ok_or_else(ParserError::truncated)?;

        let (rest, count) = be_u16(data).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
        if count == 0 {
            return Ok((
                Index {
                    table: table.clone(),
                    data_start: start + 2,
                    offsets: vec![],
                },
                start + 2,
            ));
        }

        let (rest, off_size) = be_u8(rest).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
        if off_size < 1 || off_size > 4 {
            return Err(ParserError::corrupt("cff INDEX off_size"));
        }

        let (rest, offsets) = parse_offset_list(rest, count as usize + 1, off_size)?;
        if offsets[0] != 1 {
            return Err(ParserError::corrupt("cff INDEX first offset"));
        }
        for w in offsets.windows(2) {
            if w[1] < w[0] {
                return Err(ParserError::corrupt("cff INDEX offsets not monotonic"));
            }
        }

        let data_size = offsets[offsets.len() - 1] as usize - 1;
        let offset_array_len = 2 + 1 + (count as usize + 1) * off_size as usize;
        let data_start = start + offset_array_len;
        if rest.len() < data_size {
            return Err(ParserError::truncated());
        }

        Ok((
            Index {
                table: table.clone(),
                data_start,
                offsets,
            },
            data_start + data_size,
        ))
    }
}

fn parse_offset(input: &[u8], off_size: u8) -> nom::IResult<&[u8], u32> {
    match off_size {
        1 => map!(input, be_u8, |v| v as u32),
        2 => map!(input, be_u16, |v| v as u32),
        3 => be_u24(input),
        4 => be_u32(input),
        _ => unreachable!("off_size validated to 1..=4 by caller"),
    }
}

fn parse_offset_list(input: &[u8], n: usize, off_size: u8) -> Result<(&[u8], Vec<u32>), ParserError> {
    let mut rest = input;
    let mut offsets = Vec::with_capacity(n);
    for _ in 0..n {
        let (next, offset) = parse_offset(rest, off_size).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
        offsets.push(offset);
        rest = next;
    }
    Ok((rest, offsets))
}

fn min_off_size(last_offset: u32) -> u8 {
    if last_offset <= 0xFF {
        1
    } else if last_offset <= 0xFFFF {
        2
    } else if last_offset <= 0xFF_FFFF {
        3
    } else {
        4
    }
}

/// Build an INDEX from an ordered sequence of byte strings (`spec.md`
/// §4.4.2): chooses the minimum `off_size` that addresses the final offset.
pub fn write_index(items: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    if items.is_empty() {
        out.extend_from_slice(&0u16.to_be_bytes());
        return out;
    }

    let mut offsets = Vec::with_capacity(items.len() + 1);
    let mut running = 1u32;
    offsets.push(running);
    for item in items {
        running += item.len() as u32;
        offsets.push(running);
    }
    let off_size = min_off_size(running);

    out.extend_from_slice(&(items.len() as u16).to_be_bytes());
    out.push(off_size);
    for offset in &offsets {
        let bytes = offset.to_be_bytes();
        out.extend_from_slice(&bytes[4 - off_size as usize..]);
    }
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_index_consumes_two_bytes() {
        let table: Rc<[u8]> = Rc::from(&[0x00, 0x00, 0xAA][..]);
        let (index, end) = Index::parse_from(&table, 0).unwrap();
        assert_eq!(index.len(), 0);
        assert_eq!(end, 2);
    }

    #[test]
    fn round_trips_three_items() {
        let items: [&[u8]; 3] = [&[0x00, 0x01, 0x02], &[0x03], &[0xFF, 0xFF]];
        let built = write_index(&items);
        assert_eq!(built[2], 1); // off_size

        let table: Rc<[u8]> = Rc::from(built.as_slice());
        let (index, end) = Index::parse_from(&table, 0).unwrap();
        assert_eq!(end, built.len());
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(0), Some(&[0x00, 0x01, 0x02][..]));
        assert_eq!(index.get(1), Some(&[0x03][..]));
        assert_eq!(index.get(2), Some(&[0xFF, 0xFF][..]));
    }

    #[test]
    fn rejects_non_monotonic_offsets() {
        let mut data = vec![0x00, 0x01, 0x01]; // count=1, off_size=1
        data.extend_from_slice(&[0x02, 0x01]); // offsets: 2, 1 (decreasing)
        data.push(0xAB);
        let table: Rc<[u8]> = Rc::from(data.as_slice());
        assert!(Index::parse_from(&table, 0).is_err());
    }
}
