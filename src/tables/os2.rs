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

//! `OS/2` and Windows Metrics table, versions 0 through 5. Supplemented per
//! `spec.md`'s metadata subset: it is the one table in that whitelist with a
//! version-gated tail, so its parser has to do real work instead of a flat
//! `do_parse!`.

use nom::{be_i16, be_u16, be_u32, be_u8};

use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Os2 {
    pub version: u16,
    pub avg_char_width: i16,
    pub weight_class: u16,
    pub width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub family_class: i16,
    pub panose: [u8; 10],
    pub unicode_range: [u32; 4],
    pub ach_vend_id: [u8; 4],
    pub fs_selection: u16,
    pub first_char_index: u16,
    pub last_char_index: u16,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    pub typo_line_gap: i16,
    pub win_ascent: u16,
    pub win_descent: u16,
    /// `None` for version 0 fonts.
    pub code_page_range: Option<[u32; 2]>,
    /// `None` below version 2.
    pub x_height: Option<i16>,
    pub cap_height: Option<i16>,
    pub default_char: Option<u16>,
    pub break_char: Option<u16>,
    pub max_context: Option<u16>,
}

impl SfntTable for Os2 {
    const TAG: crate::Tag = tags::OS2;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        parse_os2(data).map(|(_, result)| result).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::OS2)
        })
    }
}

named!(parse_panose<&[u8], [u8; 10]>,
    count_fixed!(u8, be_u8, 10)
);

named!(parse_unicode_range<&[u8], [u32; 4]>,
    do_parse!(
        a: be_u32 >> b: be_u32 >> c: be_u32 >> d: be_u32 >>
        ([a, b, c, d])
    )
);

named!(parse_vend_id<&[u8], [u8; 4]>,
    count_fixed!(u8, be_u8, 4)
);

named!(parse_code_page_range<&[u8], [u32; 2]>,
    do_parse!(a: be_u32 >> b: be_u32 >> ([a, b]))
);

named!(parse_os2<&[u8], Os2>,
    do_parse!(
        version: be_u16 >>
        avg_char_width: be_i16 >>
        weight_class: be_u16 >>
        width_class: be_u16 >>
        fs_type: be_u16 >>
        y_subscript_x_size: be_i16 >>
        y_subscript_y_size: be_i16 >>
        y_subscript_x_offset: be_i16 >>
        y_subscript_y_offset: be_i16 >>
        y_superscript_x_size: be_i16 >>
        y_superscript_y_size: be_i16 >>
        y_superscript_x_offset: be_i16 >>
        y_superscript_y_offset: be_i16 >>
        y_strikeout_size: be_i16 >>
        y_strikeout_position: be_i16 >>
        family_class: be_i16 >>
        panose: parse_panose >>
        unicode_range: parse_unicode_range >>
        ach_vend_id: parse_vend_id >>
        fs_selection: be_u16 >>
        first_char_index: be_u16 >>
        last_char_index: be_u16 >>
        typo_ascender: be_i16 >>
        typo_descender: be_i16 >>
        typo_line_gap: be_i16 >>
        win_ascent: be_u16 >>
        win_descent: be_u16 >>
        code_page_range: cond!(version >= 1, parse_code_page_range) >>
        x_height: cond!(version >= 2, be_i16) >>
        cap_height: cond!(version >= 2, be_i16) >>
        default_char: cond!(version >= 2, be_u16) >>
        break_char: cond!(version >= 2, be_u16) >>
        max_context: cond!(version >= 2, be_u16) >>
        (Os2 {
            version, avg_char_width, weight_class, width_class, fs_type,
            y_subscript_x_size, y_subscript_y_size, y_subscript_x_offset, y_subscript_y_offset,
            y_superscript_x_size, y_superscript_y_size, y_superscript_x_offset, y_superscript_y_offset,
            y_strikeout_size, y_strikeout_position, family_class, panose, unicode_range,
            ach_vend_id, fs_selection, first_char_index, last_char_index,
            typo_ascender, typo_descender, typo_line_gap, win_ascent, win_descent,
            code_page_range, x_height, cap_height, default_char, break_char, max_context,
        })
    )
);

#[cfg(test)]
mod test {
    use super::*;

    fn v0_bytes() -> Vec<u8> {
        let mut d = vec![0u8; 78];
        d[0..2].copy_from_slice(&0u16.to_be_bytes());
        d[4..6].copy_from_slice(&400u16.to_be_bytes()); // weight class
        d
    }

    #[test]
    fn version_0_has_no_code_page_range() {
        let os2 = Os2::from_data(&v0_bytes()).unwrap();
        assert_eq!(os2.weight_class, 400);
        assert_eq!(os2.code_page_range, None);
    }

    #[test]
    fn version_2_reads_x_height_and_cap_height() {
        let mut d = v0_bytes();
        d.extend_from_slice(&0u32.to_be_bytes()); // code page range 1
        d.extend_from_slice(&0u32.to_be_bytes()); // code page range 2
        d.extend_from_slice(&520i16.to_be_bytes()); // x height
        d.extend_from_slice(&700i16.to_be_bytes()); // cap height
        d.extend_from_slice(&[0u8; 6]); // default/break char, max context
        d[0..2].copy_from_slice(&2u16.to_be_bytes());

        let os2 = Os2::from_data(&d).unwrap();
        assert_eq!(os2.x_height, Some(520));
        assert_eq!(os2.cap_height, Some(700));
    }
}
