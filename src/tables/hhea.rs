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

use nom::{be_i16, be_u16};

use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Hhea {
    pub major_version: u16,
    pub minor_version: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    pub metric_data_format: i16,
    pub number_of_h_metrics: u16,
}

impl SfntTable for Hhea {
    const TAG: crate::Tag = tags::HHEA;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        parse_hhea(data).map(|(_, result)| result).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::HHEA)
        })
    }
}

named!(parse_hhea<&[u8], Hhea>,
    do_parse!(
        major_version: be_u16 >>
        minor_version: be_u16 >>
        ascender: be_i16 >>
        descender: be_i16 >>
        line_gap: be_i16 >>
        advance_width_max: be_u16 >>
        min_left_side_bearing: be_i16 >>
        min_right_side_bearing: be_i16 >>
        x_max_extent: be_i16 >>
        caret_slope_rise: be_i16 >>
        caret_slope_run: be_i16 >>
        caret_offset: be_i16 >>
        take!(8) >> // 4 reserved i16 fields
        metric_data_format: be_i16 >>
        number_of_h_metrics: be_u16 >>
        (Hhea {
            major_version,
            minor_version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format,
            number_of_h_metrics,
        })
    )
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_number_of_h_metrics() {
        let mut d = vec![0u8; 36];
        d[34..36].copy_from_slice(&7u16.to_be_bytes());
        let hhea = Hhea::from_data(&d).unwrap();
        assert_eq!(hhea.number_of_h_metrics, 7);
    }
}
