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

//! The `name` table (formats 0 and 1), supplemented per `spec.md`'s metadata
//! loading profile: this is one of the six tables `LoadingMode::Metadata`
//! exposes, so it has to parse without ever touching `glyf`/`CFF `.

use nom::be_u16;

use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub length: u16,
    pub offset: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameTable {
    pub format: u16,
    records: Vec<NameRecord>,
    storage: Vec<u8>,
}

impl SfntTable for NameTable {
    const TAG: crate::Tag = tags::NAME;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        let (_, (format, string_offset, records)) = parse_name_header(data).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::NAME)
        })?;
        let storage = data
            .get(string_offset as usize..)
            .ok_or_else(ParserError::truncated)?
            .to_vec();
        Ok(NameTable {
            format,
            records,
            storage,
        })
    }
}

impl NameTable {
    pub fn records(&self) -> &[NameRecord] {
        &self.records
    }

    /// Raw bytes of a name record's value; Windows-platform records
    /// (platform 3) are UTF-16BE, Macintosh (platform 1) is usually
    /// Mac Roman. Decoding is left to the caller since the right charset
    /// depends on `platform_id`/`encoding_id`.
    pub fn bytes_for(&self, record: &NameRecord) -> Option<&[u8]> {
        let start = record.offset as usize;
        let end = start + record.length as usize;
        self.storage.get(start..end)
    }

    /// Convenience accessor decoding a Windows (platform 3, UTF-16BE)
    /// record for `name_id`, falling back to any platform if no Windows
    /// record is present.
    pub fn get_string(&self, name_id: u16) -> Option<String> {
        let record = self
            .records
            .iter()
            .find(|r| r.name_id == name_id && r.platform_id == 3)
            .or_else(|| self.records.iter().find(|r| r.name_id == name_id))?;
        let bytes = self.bytes_for(record)?;
        if record.platform_id == 3 || record.platform_id == 0 {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]))
                .collect();
            Some(String::from_utf16_lossy(&units))
        } else {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

named!(parse_name_record<&[u8], NameRecord>,
    do_parse!(
        platform_id: be_u16 >>
        encoding_id: be_u16 >>
        language_id: be_u16 >>
        name_id: be_u16 >>
        length: be_u16 >>
        offset: be_u16 >>
        (NameRecord { platform_id, encoding_id, language_id, name_id, length, offset })
    )
);

named!(parse_name_header<&[u8], (u16, u16, Vec<NameRecord>)>,
    do_parse!(
        format: be_u16 >>
        count: be_u16 >>
        string_offset: be_u16 >>
        records: count!(parse_name_record, count as usize) >>
        (format, string_offset, records)
    )
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_windows_utf16_record() {
        let family = "Ab";
        let utf16: Vec<u8> = family
            .encode_utf16()
            .flat_map(|u| u.to_be_bytes())
            .collect();

        let mut d = vec![];
        d.extend_from_slice(&0u16.to_be_bytes()); // format
        d.extend_from_slice(&1u16.to_be_bytes()); // count
        d.extend_from_slice(&6u16.to_be_bytes()); // string offset (after header+1 record)
        d.extend_from_slice(&3u16.to_be_bytes()); // platform (windows)
        d.extend_from_slice(&1u16.to_be_bytes()); // encoding (unicode bmp)
        d.extend_from_slice(&0x409u16.to_be_bytes()); // language (en-US)
        d.extend_from_slice(&1u16.to_be_bytes()); // nameID (family name)
        d.extend_from_slice(&(utf16.len() as u16).to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes()); // offset within storage
        d.extend_from_slice(&utf16);

        let table = NameTable::from_data(&d).unwrap();
        assert_eq!(table.get_string(1).as_deref(), Some("Ab"));
    }
}
