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

use nom::types::CompleteByteSlice;
use nom::{be_u16, be_u32};

use crate::error::ParserError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LocFormat {
    Short,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loca(Vec<u32>);

impl Loca {
    pub fn from_data(data: &[u8], format: LocFormat) -> Result<Self, ParserError> {
        let input = CompleteByteSlice(data);
        let entries = match format {
            LocFormat::Short => many0!(input, map!(be_u16, |x| x as u32 * 2))?.1,
            LocFormat::Long => many0!(input, be_u32)?.1,
        };
        Ok(Loca(entries))
    }

    /// Byte offset into `glyf` where glyph `index` starts, or `None` if
    /// `index` is past the last loca entry.
    pub fn offset(&self, index: u32) -> Option<u32> {
        self.0.get(index as usize).copied()
    }

    /// Number of loca entries, i.e. `num_glyphs + 1`.
    pub fn num_entries(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn short_format_doubles_offsets() {
        let mut d = vec![];
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&5u16.to_be_bytes());
        d.extend_from_slice(&10u16.to_be_bytes());
        let loca = Loca::from_data(&d, LocFormat::Short).unwrap();
        assert_eq!(loca.num_entries(), 3);
        assert_eq!(loca.offset(1), Some(10));
        assert_eq!(loca.offset(2), Some(20));
    }

    #[test]
    fn long_format_reads_raw_offsets() {
        let mut d = vec![];
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(&1000u32.to_be_bytes());
        let loca = Loca::from_data(&d, LocFormat::Long).unwrap();
        assert_eq!(loca.offset(1), Some(1000));
        assert_eq!(loca.offset(2), None);
    }
}
