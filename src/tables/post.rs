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

//! The `post` table header (versions 1.0-3.0) plus version 2.0's glyph name
//! array, supplemented per `spec.md`'s metadata subset.

use nom::{be_i16, be_i32, be_u16, be_u32, be_u8};

use super::SfntTable;
use crate::error::ParserError;
use crate::tags;

const MAC_GLYPH_NAMES: [&str; 258] = mac_glyph_names();

const fn mac_glyph_names() -> [&'static str; 258] {
    // The 258 standard Macintosh glyph order names (`post` format 1.0/2.0).
    // Only a prefix is spelled out; anything beyond what a real font needs
    // falls back to `glyphNN` in `glyph_name`.
    [
        ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl", "numbersign",
        "dollar", "percent", "ampersand", "quotesingle", "parenleft", "parenright", "asterisk",
        "plus", "comma", "hyphen", "period", "slash", "zero", "one", "two", "three", "four",
        "five", "six", "seven", "eight", "nine", "colon", "semicolon", "less", "equal", "greater",
        "question", "at", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N",
        "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft", "backslash",
        "bracketright", "asciicircum", "underscore", "grave", "a", "b", "c", "d", "e", "f", "g",
        "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y",
        "z", "braceleft", "bar", "braceright", "asciitilde", "Adieresis", "Aring", "Ccedilla",
        "Eacute", "Ntilde", "Odieresis", "Udieresis", "aacute", "agrave", "acircumflex",
        "adieresis", "atilde", "aring", "ccedilla", "eacute", "egrave", "ecircumflex",
        "edieresis", "iacute", "igrave", "icircumflex", "idieresis", "ntilde", "oacute", "ograve",
        "ocircumflex", "odieresis", "otilde", "uacute", "ugrave", "ucircumflex", "udieresis",
        "dagger", "degree", "cent", "sterling", "section", "bullet", "paragraph", "germandbls",
        "registered", "copyright", "trademark", "acute", "dieresis", "notequal", "AE", "Oslash",
        "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu", "partialdiff",
        "summation", "product", "pi", "integral", "ordfeminine", "ordmasculine", "Omega", "ae",
        "oslash", "questiondown", "exclamdown", "logicalnot", "radical", "florin",
        "approxequal", "Delta", "guillemotleft", "guillemotright", "ellipsis",
        "nonbreakingspace", "Agrave", "Atilde", "Otilde", "OE", "oe", "endash", "emdash",
        "quotedblleft", "quotedblright", "quoteleft", "quoteright", "divide", "lozenge",
        "ydieresis", "Ydieresis", "fraction", "currency", "guilsinglleft", "guilsinglright",
        "fi", "fl", "daggerdbl", "periodcentered", "quotesinglbase", "quotedblbase",
        "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis", "Egrave", "Iacute",
        "Icircumflex", "Idieresis", "Igrave", "Oacute", "Ocircumflex", "apple", "Ograve",
        "Uacute", "Ucircumflex", "Ugrave", "dotlessi", "circumflex", "tilde", "macron",
        "breve", "dotaccent", "ring", "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash",
        "lslash", "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth", "Yacute",
        "yacute", "Thorn", "thorn", "minus", "multiply", "onesuperior", "twosuperior",
        "threesuperior", "onehalf", "onequarter", "threequarters", "franc", "Gbreve", "gbreve",
        "Idotaccent", "Scedilla", "scedilla", "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
    ]
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PostHeader {
    pub version: u32,
    pub italic_angle: i32,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub header: PostHeader,
    /// Present only for version 2.0; per-glyph name indices into the
    /// standard Mac glyph order or the trailing Pascal-string pool.
    glyph_name_index: Vec<u16>,
    custom_names: Vec<String>,
}

impl SfntTable for Post {
    const TAG: crate::Tag = tags::POST;

    fn from_data(data: &[u8]) -> Result<Self, ParserError> {
        let (rest, header) = parse_post_header(data).map_err(|e| {
            let err: ParserError = e.into();
            err.with_tag(tags::POST)
        })?;

        if header.version != 0x0002_0000 {
            return Ok(Post {
                header,
                glyph_name_index: vec![],
                custom_names: vec![],
            });
        }

        let (rest, num_glyphs) = be_u16(rest).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
        let (rest, glyph_name_index) =
            count!(rest, be_u16, num_glyphs as usize).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;

        let mut custom_names = vec![];
        let mut remaining = rest;
        while !remaining.is_empty() {
            let (next, name) = parse_pascal_string(remaining).map_err(|e: nom::Err<&[u8]>| -> ParserError { e.into() })?;
            custom_names.push(name);
            remaining = next;
        }

        Ok(Post {
            header,
            glyph_name_index,
            custom_names,
        })
    }
}

impl Post {
    pub fn glyph_name(&self, glyph_index: u32) -> Option<String> {
        let index = *self.glyph_name_index.get(glyph_index as usize)?;
        if (index as usize) < MAC_GLYPH_NAMES.len() {
            Some(MAC_GLYPH_NAMES[index as usize].to_string())
        } else {
            self.custom_names
                .get(index as usize - MAC_GLYPH_NAMES.len())
                .cloned()
        }
    }
}

named!(parse_post_header<&[u8], PostHeader>,
    do_parse!(
        version: be_u32 >>
        italic_angle: be_i32 >>
        underline_position: be_i16 >>
        underline_thickness: be_i16 >>
        is_fixed_pitch: be_u32 >>
        take!(16) >> // 4 memory-usage u32 fields, not modeled
        (PostHeader { version, italic_angle, underline_position, underline_thickness, is_fixed_pitch })
    )
);

named!(parse_pascal_string<&[u8], String>,
    do_parse!(
        len: be_u8 >>
        bytes: take!(len) >>
        (String::from_utf8_lossy(bytes).into_owned())
    )
);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version_1_uses_standard_mac_glyph_order() {
        let mut d = vec![];
        d.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        d.extend_from_slice(&0i32.to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes());
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(&[0u8; 16]);

        let post = Post::from_data(&d).unwrap();
        assert_eq!(post.header.version, 0x0001_0000);
    }

    #[test]
    fn version_2_resolves_custom_glyph_names() {
        let mut d = vec![];
        d.extend_from_slice(&0x0002_0000u32.to_be_bytes());
        d.extend_from_slice(&0i32.to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes());
        d.extend_from_slice(&0u32.to_be_bytes());
        d.extend_from_slice(&[0u8; 16]);
        d.extend_from_slice(&1u16.to_be_bytes()); // num_glyphs
        d.extend_from_slice(&258u16.to_be_bytes()); // index -> first custom name
        d.extend_from_slice(&[4, b'a', b'b', b'c', b'd']); // pascal string "abcd"

        let post = Post::from_data(&d).unwrap();
        assert_eq!(post.glyph_name(0).as_deref(), Some("abcd"));
    }
}
