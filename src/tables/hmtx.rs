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

//! The `hmtx` table: per-glyph advance width and left side bearing
//! (`spec.md` supplemented feature, grounded in the same record-array style
//! as `loca`).

use nom::{be_i16, be_u16};

use crate::error::ParserError;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub left_side_bearing: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hmtx {
    metrics: Vec<LongHorMetric>,
    /// Trailing `lsb`-only entries for monospaced runs past
    /// `number_of_h_metrics`; they share the last metric's advance width.
    trailing_lsb: Vec<i16>,
}

impl Hmtx {
    pub fn from_data(data: &[u8], number_of_h_metrics: u16) -> Result<Self, ParserError> {
        let (rest, metrics) = count!(data, parse_long_hor_metric, number_of_h_metrics as usize)?;
        let (_, trailing_lsb) = many0!(nom::types::CompleteByteSlice(rest), be_i16)?;
        Ok(Hmtx {
            metrics,
            trailing_lsb,
        })
    }

    pub fn advance_width(&self, glyph_index: u32) -> Option<u16> {
        self.metrics
            .get(glyph_index as usize)
            .map(|m| m.advance_width)
            .or_else(|| self.metrics.last().map(|m| m.advance_width))
    }

    pub fn left_side_bearing(&self, glyph_index: u32) -> Option<i16> {
        let i = glyph_index as usize;
        if let Some(m) = self.metrics.get(i) {
            return Some(m.left_side_bearing);
        }
        self.trailing_lsb.get(i - self.metrics.len()).copied()
    }

    pub fn num_h_metrics(&self) -> usize {
        self.metrics.len()
    }
}

named!(parse_long_hor_metric<&[u8], LongHorMetric>,
    do_parse!(
        advance_width: be_u16 >>
        left_side_bearing: be_i16 >>
        (LongHorMetric { advance_width, left_side_bearing })
    )
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trailing_lsb_entries_reuse_last_advance_width() {
        let mut d = vec![];
        d.extend_from_slice(&600u16.to_be_bytes());
        d.extend_from_slice(&10i16.to_be_bytes());
        d.extend_from_slice(&5i16.to_be_bytes()); // trailing lsb for glyph 1

        let hmtx = Hmtx::from_data(&d, 1).unwrap();
        assert_eq!(hmtx.advance_width(0), Some(600));
        assert_eq!(hmtx.advance_width(1), Some(600));
        assert_eq!(hmtx.left_side_bearing(1), Some(5));
    }
}
