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

//! The `cmap` table: encoding records plus formats 0, 4 and 12, supplemented
//! per `spec.md`'s metadata subset.

use nom::{be_u16, be_u32, be_u8};

use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Subtable {
    Format0 { glyph_id_array: Vec<u8> },
    Format4(Format4Subtable),
    Format12(Format12Subtable),
    /// Recognized but not decoded (e.g. format 6, 2, 13, 14).
    Unsupported { format: u16 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Format4Subtable {
    end_code: Vec<u16>,
    start_code: Vec<u16>,
    id_delta: Vec<i16>,
    id_range_offset: Vec<u16>,
    glyph_id_array: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Format12Subtable {
    groups: Vec<SequentialMapGroup>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SequentialMapGroup {
    pub start_char_code: u32,
    pub end_char_code: u32,
    pub start_glyph_id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cmap {
    pub records: Vec<EncodingRecord>,
    subtables: Vec<Subtable>,
}

impl SfntTable for Cmap {
    const TAG: crate::Tag = tags::CMAP;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        let (_, (_version, records)) = parse_cmap_header(data).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::CMAP)
        })?;

        let mut subtables = Vec::with_capacity(records.len());
        for record in &records {
            let sub_data = data
                .get(record.offset as usize..)
                .ok_or_else(ParserError::truncated)?;
            subtables.push(parse_subtable(sub_data)?);
        }

        Ok(Cmap { records, subtables })
    }
}

impl Cmap {
    /// Map a Unicode scalar value to a glyph index, preferring a Windows BMP
    /// (3,1) or full-Unicode (3,10) subtable if present.
    pub fn lookup(&self, code_point: u32) -> Option<u32> {
        let preferred = self
            .records
            .iter()
            .position(|r| r.platform_id == 3 && (r.encoding_id == 1 || r.encoding_id == 10))
            .or_else(|| self.records.iter().position(|r| r.platform_id == 0));

        let index = preferred?;
        match self.subtables.get(index)? {
            Subtable::Format0 { glyph_id_array } => {
                glyph_id_array.get(code_point as usize).map(|&g| g as u32)
            }
            Subtable::Format4(sub) => sub.lookup(code_point as u16),
            Subtable::Format12(sub) => sub.lookup(code_point),
            Subtable::Unsupported { .. } => None,
        }
    }
}

impl Format4Subtable {
    fn lookup(&self, code_point: u16) -> Option<u32> {
        let seg = self
            .end_code
            .iter()
            .position(|&end| code_point <= end)
            .filter(|&i| self.start_code[i] <= code_point)?;

        if self.id_range_offset[seg] == 0 {
            Some((code_point as i32 + self.id_delta[seg] as i32) as u16 as u32)
        } else {
            let offset_in_array = self.id_range_offset[seg] as usize / 2
                + (code_point - self.start_code[seg]) as usize
                - (self.id_range_offset.len() - seg);
            let raw = *self.glyph_id_array.get(offset_in_array)?;
            if raw == 0 {
                None
            } else {
                Some((raw as i32 + self.id_delta[seg] as i32) as u16 as u32)
            }
        }
    }
}

impl Format12Subtable {
    fn lookup(&self, code_point: u32) -> Option<u32> {
        let group = self
            .groups
            .iter()
            .find(|g| g.start_char_code <= code_point && code_point <= g.end_char_code)?;
        Some(group.start_glyph_id + (code_point - group.start_char_code))
    }
}

named!(parse_encoding_record<&[u8], EncodingRecord>,
    do_parse!(
        platform_id: be_u16 >>
        encoding_id: be_u16 >>
        offset: be_u32 >>
        (EncodingRecord { platform_id, encoding_id, offset })
    )
);

named!(parse_cmap_header<&[u8], (u16, Vec<EncodingRecord>)>,
    do_parse!(
        version: be_u16 >>
        num_tables: be_u16 >>
        records: count!(parse_encoding_record, num_tables as usize) >>
        (version, records)
    )
);

fn parse_subtable(data: &[u8]) -> Result<Subtable, ParserError> {
    let (_, format) = be_u16(data)?;
    match format {
        0 => {
            let (_, (_len, _lang, glyph_id_array)) = parse_format0(data)?;
            Ok(Subtable::Format0 { glyph_id_array })
        }
        4 => parse_format4(data).map(Subtable::Format4),
        12 => parse_format12(data).map(Subtable::Format12),
        other => Ok(Subtable::Unsupported { format: other }),
    }
}

named!(parse_format0<&[u8], (u16, u16, Vec<u8>)>,
    do_parse!(
        tag!([0u8, 0]) >>
        length: be_u16 >>
        language: be_u16 >>
        glyph_id_array: count!(be_u8, 256) >>
        (length, language, glyph_id_array)
    )
);

fn parse_format4(data: &[u8]) -> Result<Format4Subtable, ParserError> {
    named!(header<&[u8], (u16, u16, u16, u16, u16)>,
        do_parse!(
            tag!([0u8, 4]) >>
            _length: be_u16 >>
            _language: be_u16 >>
            seg_x2: be_u16 >>
            search_range: be_u16 >>
            entry_selector: be_u16 >>
            range_shift: be_u16 >>
            (seg_x2, search_range, entry_selector, range_shift, seg_x2)
        )
    );
    let (rest, (seg_x2, _, _, _, _)) = header(data)?;
    let seg_count = seg_x2 as usize / 2;

    let (rest, end_code) = count!(rest, be_u16, seg_count)?;
    let (rest, _reserved_pad) = be_u16(rest)?;
    let (rest, start_code) = count!(rest, be_u16, seg_count)?;
    let (rest, id_delta) = count!(rest, nom::be_i16, seg_count)?;
    let (rest, id_range_offset) = count!(rest, be_u16, seg_count)?;
    let (_, glyph_id_array) = nom::many0!(nom::types::CompleteByteSlice(rest), be_u16)?;

    Ok(Format4Subtable {
        end_code,
        start_code,
        id_delta,
        id_range_offset,
        glyph_id_array,
    })
}

fn parse_format12(data: &[u8]) -> Result<Format12Subtable, ParserError> {
    named!(header<&[u8], u32>,
        do_parse!(
            tag!([0u8, 12]) >>
            be_u16 >> // reserved
            _length: be_u32 >>
            _language: be_u32 >>
            num_groups: be_u32 >>
            (num_groups)
        )
    );
    named!(group<&[u8], SequentialMapGroup>,
        do_parse!(
            start_char_code: be_u32 >>
            end_char_code: be_u32 >>
            start_glyph_id: be_u32 >>
            (SequentialMapGroup { start_char_code, end_char_code, start_glyph_id })
        )
    );

    let (rest, num_groups) = header(data)?;
    let (_, groups) = count!(rest, group, num_groups as usize)?;
    Ok(Format12Subtable { groups })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn format4_maps_single_segment() {
        // one real segment [65, 70] with a constant delta, plus the
        // mandatory trailing 0xFFFF terminator segment.
        let mut d = vec![];
        d.extend_from_slice(&4u16.to_be_bytes()); // format
        d.extend_from_slice(&0u16.to_be_bytes()); // length (unused by parser)
        d.extend_from_slice(&0u16.to_be_bytes()); // language
        d.extend_from_slice(&4u16.to_be_bytes()); // segCountX2 = 2 segments
        d.extend_from_slice(&[0u8; 6]); // searchRange/entrySelector/rangeShift
        d.extend_from_slice(&70u16.to_be_bytes()); // endCode[0]
        d.extend_from_slice(&0xFFFFu16.to_be_bytes()); // endCode[1]
        d.extend_from_slice(&0u16.to_be_bytes()); // reservedPad
        d.extend_from_slice(&65u16.to_be_bytes()); // startCode[0]
        d.extend_from_slice(&0xFFFFu16.to_be_bytes()); // startCode[1]
        d.extend_from_slice(&1i16.to_be_bytes()); // idDelta[0]: glyph = code + 1
        d.extend_from_slice(&1i16.to_be_bytes()); // idDelta[1]
        d.extend_from_slice(&0u16.to_be_bytes()); // idRangeOffset[0]
        d.extend_from_slice(&0u16.to_be_bytes()); // idRangeOffset[1]

        let sub = parse_format4(&d).unwrap();
        assert_eq!(sub.lookup(65), Some(66));
        assert_eq!(sub.lookup(70), Some(71));
        assert_eq!(sub.lookup(71), None);
    }

    #[test]
    fn format12_maps_sequential_group() {
        let mut d = vec![];
        d.extend_from_slice(&12u16.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes()); // reserved
        d.extend_from_slice(&0u32.to_be_bytes()); // length
        d.extend_from_slice(&0u32.to_be_bytes()); // language
        d.extend_from_slice(&1u32.to_be_bytes()); // numGroups
        d.extend_from_slice(&0x1F600u32.to_be_bytes()); // start char (emoji range)
        d.extend_from_slice(&0x1F60Fu32.to_be_bytes()); // end char
        d.extend_from_slice(&500u32.to_be_bytes()); // start glyph id

        let sub = parse_format12(&d).unwrap();
        assert_eq!(sub.lookup(0x1F600), Some(500));
        assert_eq!(sub.lookup(0x1F605), Some(505));
        assert_eq!(sub.lookup(0x1F610), None);
    }
}
