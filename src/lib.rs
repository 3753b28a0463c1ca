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

#![deny(missing_debug_implementations)]

#[macro_use]
extern crate nom;
#[macro_use]
extern crate log;
#[macro_use]
extern crate derive_more;

use std::env;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use std::rc::Rc;

pub mod checksum;
pub mod cff;
pub mod container;
pub mod error;
pub mod glyph_accessor;
pub mod sfnt;
pub mod tables;

mod cff_glyph_accessor;
mod ttf_glyph_accessor;

use crate::error::ParserError;

pub use crate::glyph_accessor::{GlyphOutline, Outline, OutlineCommand};
pub use crate::sfnt::loader::{Collection, Font};
pub use crate::sfnt::{OffsetTable, TableDirectoryEntry};
pub use crate::tables::ParsedTable;

pub type GlyphIndex = u32;

/// A four-byte SFNT tag (e.g. `head`, `CFF `). Comparison is byte-exact and
/// case-sensitive: `CFF ` and `cff ` are different tags.
///
/// Tags are always normalized to this fixed `[u8; 4]` representation at
/// ingestion, whether they were read off the wire or built from a `&str`
/// literal in code, so the two can never collide as different map keys
/// (`spec.md` §3 and §9 call this out explicitly as a real bug class).
#[derive(Copy, Clone, Hash, PartialEq, Eq, Ord, PartialOrd)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Build a tag from four bytes, used when parsing SFNT directories.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    /// Build a tag from individual chars, as used for compile-time literals
    /// like `Tag::new('h', 'e', 'a', 'd')`.
    pub const fn new(a: char, b: char, c: char, d: char) -> Self {
        Tag([a as u8, b as u8, c as u8, d as u8])
    }

    /// Normalize a `&str` (padding with spaces, truncating past 4 bytes) to
    /// the canonical tag representation. Used for tags built from
    /// user-supplied or table-derived strings so they hash identically to
    /// tags read directly off the wire.
    pub fn from_str_normalized(s: &str) -> Self {
        let mut bytes = [b' '; 4];
        for (i, b) in s.as_bytes().iter().take(4).enumerate() {
            bytes[i] = *b;
        }
        Tag(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    fn tag_to_string(&self) -> std::borrow::Cow<str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Tag({:?})", self.tag_to_string())
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.tag_to_string())
    }
}

/// Well-known tags referenced throughout the registry and the containers.
pub mod tags {
    use super::Tag;

    pub const HEAD: Tag = Tag::new('h', 'e', 'a', 'd');
    pub const HHEA: Tag = Tag::new('h', 'h', 'e', 'a');
    pub const MAXP: Tag = Tag::new('m', 'a', 'x', 'p');
    pub const NAME: Tag = Tag::new('n', 'a', 'm', 'e');
    pub const OS2: Tag = Tag::from_bytes([b'O', b'S', b'/', b'2']);
    pub const POST: Tag = Tag::new('p', 'o', 's', 't');
    pub const CMAP: Tag = Tag::new('c', 'm', 'a', 'p');
    pub const LOCA: Tag = Tag::new('l', 'o', 'c', 'a');
    pub const GLYF: Tag = Tag::new('g', 'l', 'y', 'f');
    pub const HMTX: Tag = Tag::new('h', 'm', 't', 'x');
    pub const CFF_: Tag = Tag::from_bytes([b'C', b'F', b'F', b' ']);
    pub const CFF2: Tag = Tag::new('C', 'F', 'F', '2');
    pub const SVG_: Tag = Tag::from_bytes([b'S', b'V', b'G', b' ']);
    pub const DSIG: Tag = Tag::new('D', 'S', 'I', 'G');

    /// The exact whitelist exposed by `LoadingMode::Metadata` (`spec.md` §3).
    pub const METADATA_SUBSET: [Tag; 6] = [NAME, HEAD, HHEA, MAXP, OS2, POST];
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutlineType {
    TrueType,
    Cff,
    Cff2,
    Svg,
}

/// A closed choice between the two loading profiles described in `spec.md`
/// §3. Affects which tables `Font::table` will serve, not parse
/// correctness: every table present in the directory still parses
/// correctly, `Metadata` mode just refuses to hand back anything outside the
/// whitelist.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadingMode {
    Metadata,
    Full,
}

impl LoadingMode {
    pub fn allows(&self, tag: Tag) -> bool {
        match self {
            LoadingMode::Full => true,
            LoadingMode::Metadata => tags::METADATA_SUBSET.contains(&tag),
        }
    }
}

/// The read strategy used while bringing up a `Font`, orthogonal to
/// `LoadingMode`: the mode governs *visibility*, this governs *when bytes are
/// actually read*.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Read every table's bytes into memory at load time.
    EagerFull,
    /// Read only the tables in the metadata subset at load time.
    EagerMetadata,
    /// Keep the byte source open; read a table's bytes on first request.
    Lazy,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub mode: LoadingMode,
    pub strategy: ReadStrategy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            mode: LoadingMode::Full,
            strategy: ReadStrategy::EagerFull,
        }
    }
}

impl LoadOptions {
    pub fn new(mode: LoadingMode, strategy: ReadStrategy) -> Self {
        LoadOptions { mode, strategy }
    }

    /// Resolve default mode/laziness from the two environment signals named
    /// in `spec.md` §6. Programmatic callers that build `LoadOptions`
    /// directly (via `new`/`Default`) never consult the environment.
    pub fn from_env() -> Self {
        let mode = match env::var("SFNT_CORE_LOADING_MODE") {
            Ok(v) if v.eq_ignore_ascii_case("metadata") => LoadingMode::Metadata,
            _ => LoadingMode::Full,
        };
        let lazy = match env::var("SFNT_CORE_LAZY") {
            Ok(v) => parse_bool(&v).unwrap_or(false),
            Err(_) => false,
        };
        let strategy = if lazy {
            ReadStrategy::Lazy
        } else if mode == LoadingMode::Metadata {
            ReadStrategy::EagerMetadata
        } else {
            ReadStrategy::EagerFull
        };
        LoadOptions { mode, strategy }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Result of `load`: either a single font or a collection of them.
#[derive(Debug)]
pub enum LoadResult {
    Font(Font),
    Collection(Collection),
}

/// Types that can give access to raw SFNT table bytes. Implemented by
/// `Font`, and implementable by test/fuzz shims that want to hand the
/// registry synthetic table data without going through a real container.
///
/// Returns an `Rc<[u8]>` rather than a borrowed slice so that implementations
/// backed by a lazy, page-cached loader can serve bytes assembled on demand
/// without tying the result to `&self`'s lifetime.
pub trait OpentypeTableAccess {
    fn table_data(&self, tag: Tag) -> Option<Rc<[u8]>>;

    fn all_tables(&self) -> Vec<Tag>;

    fn has_table(&self, tag: Tag) -> bool {
        self.table_data(tag).is_some()
    }

    fn outline_type(&self) -> OutlineType {
        if self.has_table(tags::SVG_) {
            OutlineType::Svg
        } else if self.has_table(tags::CFF_) {
            OutlineType::Cff
        } else if self.has_table(tags::CFF2) {
            OutlineType::Cff2
        } else {
            OutlineType::TrueType
        }
    }
}

/// Load a font resource from bytes, sniffing its container format per
/// `spec.md` §4.1.
pub fn load(bytes: &[u8], options: LoadOptions) -> Result<LoadResult, ParserError> {
    container::load_bytes(bytes, options)
}

/// Load a font resource from a file path.
pub fn load_path(path: impl AsRef<Path>, options: LoadOptions) -> Result<LoadResult, ParserError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| ParserError::from(e).with_path(path.display().to_string()))?;
    container::load_bytes(&bytes, options).map_err(|e| e.with_path(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_normalization_matches_char_literal_construction() {
        assert_eq!(Tag::from_str_normalized("head"), tags::HEAD);
        assert_eq!(Tag::from_str_normalized("OS/2"), tags::OS2);
    }

    #[test]
    fn tag_normalization_pads_short_strings_with_spaces() {
        assert_eq!(Tag::from_str_normalized("CFF"), Tag::from_bytes(*b"CFF "));
    }

    #[test]
    fn metadata_mode_allows_only_whitelisted_tags() {
        assert!(LoadingMode::Metadata.allows(tags::NAME));
        assert!(!LoadingMode::Metadata.allows(tags::CFF_));
        assert!(LoadingMode::Full.allows(tags::CFF_));
    }
}
