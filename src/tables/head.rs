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

use nom::{be_i16, be_i64, be_u16, be_u32};

use super::loca::LocFormat;
use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: u32,
    pub check_sum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: i64,
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: LocFormat,
    pub glyph_data_format: i16,
}

impl SfntTable for Head {
    const TAG: crate::Tag = tags::HEAD;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        parse_head(data).map(|(_, result)| result).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::HEAD)
        })
    }
}

named!(parse_head<&[u8], Head>,
    do_parse!(
        major_version: be_u16 >>
        minor_version: be_u16 >>
        font_revision: be_u32 >>
        check_sum_adjustment: be_u32 >>
        magic_number: be_u32 >>
        flags: be_u16 >>
        units_per_em: be_u16 >>
        created: be_i64 >>
        modified: be_i64 >>
        x_min: be_i16 >>
        y_min: be_i16 >>
        x_max: be_i16 >>
        y_max: be_i16 >>
        mac_style: be_u16 >>
        lowest_rec_ppem: be_u16 >>
        font_direction_hint: be_i16 >>
        index_to_loc_format: be_i16 >>
        glyph_data_format: be_i16 >>
        (Head {
            major_version,
            minor_version,
            font_revision,
            check_sum_adjustment,
            magic_number,
            flags,
            units_per_em,
            created,
            modified,
            x_min,
            y_min,
            x_max,
            y_max,
            mac_style,
            lowest_rec_ppem,
            font_direction_hint,
            index_to_loc_format: match index_to_loc_format {
                0 => LocFormat::Short,
                _ => LocFormat::Long,
            },
            glyph_data_format
        })
    )
);

#[cfg(test)]
mod test {
    use super::*;

    fn sample_head(loc_format: i16) -> Vec<u8> {
        let mut d = vec![];
        d.extend_from_slice(&1u16.to_be_bytes()); // major
        d.extend_from_slice(&0u16.to_be_bytes()); // minor
        d.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // font revision
        d.extend_from_slice(&0u32.to_be_bytes()); // checksum adjustment
        d.extend_from_slice(&0x5F0F3CF5u32.to_be_bytes()); // magic
        d.extend_from_slice(&0u16.to_be_bytes()); // flags
        d.extend_from_slice(&1000u16.to_be_bytes()); // units per em
        d.extend_from_slice(&0i64.to_be_bytes()); // created
        d.extend_from_slice(&0i64.to_be_bytes()); // modified
        d.extend_from_slice(&0x1234i16.to_be_bytes()); // x_min
        d.extend_from_slice(&0x1234i16.to_be_bytes()); // y_min
        d.extend_from_slice(&0x1234i16.to_be_bytes()); // x_max
        d.extend_from_slice(&0x1234i16.to_be_bytes()); // y_max
        d.extend_from_slice(&0u16.to_be_bytes()); // mac style
        d.extend_from_slice(&8u16.to_be_bytes()); // lowest rec ppem
        d.extend_from_slice(&1i16.to_be_bytes()); // font direction hint
        d.extend_from_slice(&loc_format.to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes()); // glyph data format
        d
    }

    #[test]
    fn parses_long_loc_format() {
        let bytes = sample_head(1);
        let head = Head::from_data(&bytes).unwrap();
        assert_eq!(head.x_min, 0x1234);
        assert_eq!(head.index_to_loc_format, LocFormat::Long);
        assert_eq!(head.units_per_em, 1000);
    }

    #[test]
    fn parses_short_loc_format() {
        let bytes = sample_head(0);
        let head = Head::from_data(&bytes).unwrap();
        assert_eq!(head.index_to_loc_format, LocFormat::Short);
    }
}
