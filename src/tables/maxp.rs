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

use nom::{be_u16, be_u32};

use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

/// Only `version` and `num_glyphs` are exposed: the remaining 13 fields of
/// the 1.0 maxp are TrueType-rasterizer hinting limits, irrelevant to a
/// container/CFF engine with no hinting VM (`spec.md` Non-goals).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Maxp {
    pub version: u32,
    pub num_glyphs: u16,
}

impl SfntTable for Maxp {
    const TAG: crate::Tag = tags::MAXP;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        parse_maxp(data).map(|(_, result)| result).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::MAXP)
        })
    }
}

named!(parse_maxp<&[u8], Maxp>,
    do_parse!(
        version: be_u32 >>
        num_glyphs: be_u16 >>
        cond!(version >= 0x0001_0000, take!(26)) >>
        (Maxp { version, num_glyphs })
    )
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version_0_5_has_no_trailing_fields() {
        let mut d = vec![];
        d.extend_from_slice(&0x0000_5000u32.to_be_bytes());
        d.extend_from_slice(&42u16.to_be_bytes());
        let maxp = Maxp::from_data(&d).unwrap();
        assert_eq!(maxp.num_glyphs, 42);
    }

    #[test]
    fn version_1_0_consumes_hinting_fields() {
        let mut d = vec![0u8; 32];
        d[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        d[4..6].copy_from_slice(&10u16.to_be_bytes());
        let maxp = Maxp::from_data(&d).unwrap();
        assert_eq!(maxp.num_glyphs, 10);
    }
}
