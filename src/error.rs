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

use std::io;

use thiserror::Error;

use crate::Tag;

/// Error raised by any component of the core. Small by value (a boxed
/// `ErrorKind`) since `Result<T, ParserError>` propagates through every
/// fallible call in this crate.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ParserError {
    kind: Box<ErrorKind>,
    /// File path or an opaque buffer identity, attached by the Loader.
    pub path: Option<String>,
    /// Table tag in scope when the error occurred, if known.
    pub tag: Option<Tag>,
    /// Byte offset in scope when the error occurred, if known.
    pub offset: Option<u64>,
}

impl ParserError {
    pub fn new(kind: ErrorKind) -> Self {
        ParserError {
            kind: Box::new(kind),
            path: None,
            tag: None,
            offset: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn from_string(s: String) -> Self {
        ParserError::new(ErrorKind::Other(s))
    }

    pub fn corrupt(field: impl Into<String>) -> Self {
        ParserError::new(ErrorKind::Corrupt(field.into()))
    }

    pub fn truncated() -> Self {
        ParserError::new(ErrorKind::Truncated)
    }

    pub fn unknown_format() -> Self {
        ParserError::new(ErrorKind::UnknownFormat)
    }

    pub fn unsupported_version(found: impl Into<String>) -> Self {
        ParserError::new(ErrorKind::UnsupportedVersion(found.into()))
    }

    pub fn missing_required_table(tag: Tag) -> Self {
        ParserError::new(ErrorKind::MissingRequiredTable(tag))
    }

    pub fn mode_restricted(tag: Tag) -> Self {
        ParserError::new(ErrorKind::ModeRestricted(tag))
    }

    pub fn decompression_failed(reason: impl Into<String>) -> Self {
        ParserError::new(ErrorKind::DecompressionFailed(reason.into()))
    }

    pub fn write_failed(reason: impl Into<String>) -> Self {
        ParserError::new(ErrorKind::WriteFailed(reason.into()))
    }

    pub fn font_not_found(index: usize) -> Self {
        ParserError::new(ErrorKind::FontNotFound(index))
    }

    pub fn glyph_parse(index: u32, cause: ParserError) -> Self {
        ParserError::new(ErrorKind::GlyphParse { index, cause })
    }

    pub(crate) fn from_table_parse_err(tag: Tag, err: ParserError) -> Self {
        ParserError::new(ErrorKind::TableParse(tag, Some(err)))
    }

    pub fn expected_table(tag: Tag) -> Self {
        ParserError::new(ErrorKind::TableMissing(tag))
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("file not found")]
    FileNotFound,
    #[error("first four bytes match no known container signature")]
    UnknownFormat,
    #[error("unsupported header version: {0}")]
    UnsupportedVersion(String),
    #[error("read past end of input")]
    Truncated,
    #[error("invariant violated in field `{0}`")]
    Corrupt(String),
    #[error("required table `{0}` is absent")]
    MissingRequiredTable(Tag),
    #[error("table `{0}` exists but is not visible in the active loading mode")]
    ModeRestricted(Tag),
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
    #[error("sink rejected bytes: {0}")]
    WriteFailed(String),
    #[error("font index {0} not present in collection")]
    FontNotFound(usize),
    #[error("table `{0}` is present but not in the directory")]
    TableMissing(Tag),
    #[error("`{0}` table could not be parsed")]
    TableParse(Tag, Option<ParserError>),
    #[error("glyph at index {index} could not be parsed")]
    GlyphParse { index: u32, cause: ParserError },
    #[error("{0}")]
    Other(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<io::Error> for ParserError {
    fn from(err: io::Error) -> ParserError {
        ParserError::new(ErrorKind::Io(err))
    }
}

impl<'a> From<nom::Err<&'a [u8]>> for ParserError {
    fn from(nom_err: nom::Err<&'a [u8]>) -> ParserError {
        match nom_err {
            nom::Err::Incomplete(_) => ParserError::truncated(),
            nom::Err::Error(ctx) | nom::Err::Failure(ctx) => {
                let v: Vec<(&'a [u8], nom::ErrorKind)> = nom::error_to_list(&ctx);
                ParserError::corrupt(format!(
                    "{:?}",
                    v.iter().map(|(_, k)| k).collect::<Vec<_>>()
                ))
            }
        }
    }
}

impl<'a> From<nom::Err<nom::types::CompleteByteSlice<'a>>> for ParserError {
    fn from(nom_err: nom::Err<nom::types::CompleteByteSlice<'a>>) -> ParserError {
        match nom_err {
            nom::Err::Incomplete(_) => ParserError::truncated(),
            nom::Err::Error(ctx) | nom::Err::Failure(ctx) => {
                let v: Vec<(nom::types::CompleteByteSlice<'a>, nom::ErrorKind)> =
                    nom::error_to_list(&ctx);
                ParserError::corrupt(format!(
                    "{:?}",
                    v.iter().map(|(_, k)| k).collect::<Vec<_>>()
                ))
            }
        }
    }
}
