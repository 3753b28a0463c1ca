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

pub mod cff;
pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;

use std::rc::Rc;

use crate::error::ParserError;
use crate::sfnt::loader::Font;
use crate::{tags, Tag};

/// Common shape for the context-free tables: `from_data` has no external
/// dependencies on sibling tables. `loca` and `hmtx` need context (the
/// `head`/`hhea`/`maxp` values) and so expose their own `from_data` with
/// extra arguments instead of implementing this trait.
pub trait SfntTable: Sized {
    const TAG: Tag;

    fn from_data(data: &[u8]) -> Result<Self, ParserError>;
}

/// The tagged union every registered table parses into. Tags outside the
/// registry (e.g. `DSIG`, `SVG `, vendor tables) come back as `Raw`.
#[derive(Debug, Clone)]
pub enum ParsedTable {
    Head(head::Head),
    Hhea(hhea::Hhea),
    Maxp(maxp::Maxp),
    Name(name::NameTable),
    Post(post::Post),
    Os2(os2::Os2),
    Cmap(cmap::Cmap),
    Loca(loca::Loca),
    Hmtx(hmtx::Hmtx),
    Glyf(glyf::Glyf),
    Cff(cff::CffTable),
    Raw(Rc<[u8]>),
}

/// Static dispatch from tag to parser (`spec.md` §4.3): tables that need
/// sibling-table context (`loca` needs `head`, `hmtx` needs `hhea`/`maxp`)
/// fetch it through `font`, which is itself served from the same table
/// cache, so asking for `hmtx` before `hhea` has been parsed just parses
/// `hhea` first and caches it.
pub(crate) fn parse_table(font: &Font, tag: Tag, data: &[u8]) -> Result<ParsedTable, ParserError> {
    match tag {
        t if t == tags::HEAD => Ok(ParsedTable::Head(head::Head::from_data(data)?)),
        t if t == tags::HHEA => Ok(ParsedTable::Hhea(hhea::Hhea::from_data(data)?)),
        t if t == tags::MAXP => Ok(ParsedTable::Maxp(maxp::Maxp::from_data(data)?)),
        t if t == tags::NAME => Ok(ParsedTable::Name(name::NameTable::from_data(data)?)),
        t if t == tags::POST => Ok(ParsedTable::Post(post::Post::from_data(data)?)),
        t if t == tags::OS2 => Ok(ParsedTable::Os2(os2::Os2::from_data(data)?)),
        t if t == tags::CMAP => Ok(ParsedTable::Cmap(cmap::Cmap::from_data(data)?)),
        t if t == tags::CFF_ => Ok(ParsedTable::Cff(cff::CffTable::from_data(data)?)),
        t if t == tags::LOCA => {
            let head = font.head()?;
            Ok(ParsedTable::Loca(loca::Loca::from_data(
                data,
                head.index_to_loc_format,
            )?))
        }
        t if t == tags::HMTX => {
            let hhea = font.hhea()?;
            Ok(ParsedTable::Hmtx(hmtx::Hmtx::from_data(
                data,
                hhea.number_of_h_metrics,
            )?))
        }
        t if t == tags::GLYF => Ok(ParsedTable::Glyf(glyf::Glyf::from_data(data)?)),
        _ => Ok(ParsedTable::Raw(Rc::from(data))),
    }
}
