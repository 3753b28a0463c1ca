//! The SFNT Loader (`spec.md` §4.2): parses the offset table and directory,
//! then serves table bytes under one of three read strategies, gated by
//! `LoadingMode`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::rc::Rc;

use crate::error::ParserError;
use crate::sfnt::{parse_font_header, OffsetTable, TableDirectoryEntry};
use crate::tables::ParsedTable;
use crate::{tags, LoadOptions, LoadingMode, OpentypeTableAccess, ReadStrategy, Tag};

/// 4 KiB, the page granularity used by the lazy single-table read path
/// (`spec.md` §4.2).
const PAGE_SIZE: u64 = 4096;
/// Gap under which adjacent metadata-subset tables are coalesced into one
/// batched read (`spec.md` §4.2).
const BATCH_GAP_THRESHOLD: u64 = 8192;

/// Abstraction over "a place table bytes can be read from", so the loader's
/// read-count optimizations (batched metadata reads, page caching) can be
/// exercised in tests with a counting shim, per `spec.md` §8 scenario 1.
pub trait ByteSource: fmt::Debug {
    fn len(&self) -> u64;
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), ParserError>;
    /// Number of discrete read operations issued so far. Real sources don't
    /// need to track this; it defaults to 0 and is overridden by test shims.
    fn read_count(&self) -> usize {
        0
    }
}

#[derive(Debug)]
pub struct MemorySource(pub Rc<[u8]>);

impl ByteSource for MemorySource {
    fn len(&self) -> u64 {
        self.0.len() as u64
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), ParserError> {
        let start = offset as usize;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(ParserError::truncated)?;
        let slice = self.0.get(start..end).ok_or_else(ParserError::truncated)?;
        buf.copy_from_slice(slice);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileSource {
    file: RefCell<File>,
    len: u64,
    reads: Cell<usize>,
}

impl FileSource {
    pub fn open(file: File) -> Result<Self, ParserError> {
        let len = file.metadata()?.len();
        Ok(FileSource {
            file: RefCell::new(file),
            len,
            reads: Cell::new(0),
        })
    }
}

impl ByteSource for FileSource {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<(), ParserError> {
        let mut file = self.file.borrow_mut();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        self.reads.set(self.reads.get() + 1);
        Ok(())
    }

    fn read_count(&self) -> usize {
        self.reads.get()
    }
}

/// A single loaded SFNT resource: offset table, directory, and on-demand
/// access to table bytes and their parsed representations (`spec.md` §3).
pub struct Font {
    pub(crate) header: OffsetTable,
    pub(crate) directory: Vec<TableDirectoryEntry>,
    /// Absolute offset of this font's header within `source` (nonzero for
    /// members of a TTC/OTC).
    pub(crate) base_offset: u64,
    pub(crate) mode: LoadingMode,
    pub(crate) strategy: ReadStrategy,
    pub(crate) source: Rc<dyn ByteSource>,
    page_cache: RefCell<HashMap<u64, Rc<[u8]>>>,
    table_bytes: RefCell<HashMap<Tag, Rc<[u8]>>>,
    parsed_tables: RefCell<HashMap<Tag, Rc<ParsedTable>>>,
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Font")
            .field("header", &self.header)
            .field("directory", &self.directory)
            .field("mode", &self.mode)
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl Font {
    /// Build a `Font` from an in-memory buffer (`spec.md` §6 `load`).
    pub fn from_bytes(bytes: &[u8], options: LoadOptions) -> Result<Self, ParserError> {
        let source: Rc<dyn ByteSource> = Rc::new(MemorySource(Rc::from(bytes)));
        Font::from_source(source, 0, options)
    }

    /// Build a `Font` from a file, honoring `options.strategy` for real lazy
    /// reads (`spec.md` §4.2 "Lazy").
    pub fn from_file(file: File, options: LoadOptions) -> Result<Self, ParserError> {
        let source: Rc<dyn ByteSource> = Rc::new(FileSource::open(file)?);
        Font::from_source(source, 0, options)
    }

    pub(crate) fn from_source(
        source: Rc<dyn ByteSource>,
        base_offset: u64,
        options: LoadOptions,
    ) -> Result<Self, ParserError> {
        let mut header_buf = [0u8; 12];
        source.read_at(base_offset, &mut header_buf)?;
        let (_, header) = crate::sfnt::parse_offset_table(&header_buf)?;

        let dir_bytes_len = 12 + 16 * header.num_tables as u64;
        let mut full = vec![0u8; dir_bytes_len as usize];
        source.read_at(base_offset, &mut full)?;
        let (header, directory) = parse_font_header(&full)?;

        let mut font = Font {
            header,
            directory,
            base_offset,
            mode: options.mode,
            strategy: options.strategy,
            source,
            page_cache: RefCell::new(HashMap::new()),
            table_bytes: RefCell::new(HashMap::new()),
            parsed_tables: RefCell::new(HashMap::new()),
        };
        font.validate_structure()?;
        font.warm_up()?;
        Ok(font)
    }

    fn validate_structure(&self) -> Result<(), ParserError> {
        if !self.directory.iter().any(|e| e.tag == tags::HEAD) {
            return Err(ParserError::missing_required_table(tags::HEAD));
        }
        let file_len = self.source.len();
        for entry in &self.directory {
            let end = self.base_offset + entry.offset as u64 + entry.length as u64;
            if end > file_len {
                return Err(ParserError::corrupt(format!(
                    "table `{}` extends past end of input",
                    entry.tag
                ))
                .with_tag(entry.tag));
            }
        }
        if self.header.is_cff_flavored()
            && !self.directory.iter().any(|e| e.tag == tags::CFF_ || e.tag == tags::CFF2)
        {
            return Err(ParserError::corrupt(
                "OpenType-flavored font missing `CFF `/`CFF2`",
            ));
        }
        if self.header.is_truetype_flavored()
            && !self.directory.iter().any(|e| e.tag == tags::GLYF)
        {
            return Err(ParserError::missing_required_table(tags::GLYF));
        }
        Ok(())
    }

    /// Apply the read strategy at construction time: eager modes populate
    /// `table_bytes` up front; `Lazy` does nothing here.
    fn warm_up(&mut self) -> Result<(), ParserError> {
        match self.strategy {
            ReadStrategy::Lazy => Ok(()),
            ReadStrategy::EagerFull => {
                let tags: Vec<Tag> = self.directory.iter().map(|e| e.tag).collect();
                for tag in tags {
                    self.load_table_direct(tag)?;
                }
                Ok(())
            }
            ReadStrategy::EagerMetadata => self.batched_metadata_read(),
        }
    }

    /// One seek + one read per entry, no page cache involved: used for eager
    /// strategies where the full table is wanted immediately regardless of
    /// size.
    fn load_table_direct(&self, tag: Tag) -> Result<(), ParserError> {
        let entry = match self.directory.iter().find(|e| e.tag == tag) {
            Some(e) => *e,
            None => return Ok(()),
        };
        let mut buf = vec![0u8; entry.length as usize];
        self.source
            .read_at(self.base_offset + entry.offset as u64, &mut buf)?;
        self.table_bytes.borrow_mut().insert(tag, Rc::from(buf));
        Ok(())
    }

    /// Page-aware batched metadata read (`spec.md` §4.2): sort the metadata
    /// subset's directory entries by offset, coalesce runs whose gap is
    /// `<= BATCH_GAP_THRESHOLD`, and issue one read per batch.
    fn batched_metadata_read(&self) -> Result<(), ParserError> {
        let mut entries: Vec<TableDirectoryEntry> = self
            .directory
            .iter()
            .filter(|e| tags::METADATA_SUBSET.contains(&e.tag))
            .copied()
            .collect();
        entries.sort_unstable_by_key(|e| e.offset);

        let mut i = 0;
        while i < entries.len() {
            let batch_start = entries[i].offset as u64;
            let mut batch_end = entries[i].offset as u64 + entries[i].length as u64;
            let mut j = i + 1;
            while j < entries.len() {
                let next_start = entries[j].offset as u64;
                if next_start.saturating_sub(batch_end) <= BATCH_GAP_THRESHOLD {
                    batch_end = batch_end.max(next_start + entries[j].length as u64);
                    j += 1;
                } else {
                    break;
                }
            }

            let mut buf = vec![0u8; (batch_end - batch_start) as usize];
            self.source
                .read_at(self.base_offset + batch_start, &mut buf)?;

            for e in &entries[i..j] {
                let rel_start = (e.offset as u64 - batch_start) as usize;
                let rel_end = rel_start + e.length as usize;
                self.table_bytes
                    .borrow_mut()
                    .insert(e.tag, Rc::from(&buf[rel_start..rel_end]));
            }
            i = j;
        }
        Ok(())
    }

    /// Lazy single-table read (`spec.md` §4.2): align to page boundaries,
    /// serve each page from the per-font page cache, compose the requested
    /// slice from page fragments.
    fn load_table_paged(&self, entry: &TableDirectoryEntry) -> Result<Rc<[u8]>, ParserError> {
        let start = self.base_offset + entry.offset as u64;
        let end = start + entry.length as u64;
        let aligned_start = (start / PAGE_SIZE) * PAGE_SIZE;
        let aligned_end = ((end + PAGE_SIZE - 1) / PAGE_SIZE) * PAGE_SIZE;

        let mut out = Vec::with_capacity((end - start) as usize);
        let mut page_start = aligned_start;
        while page_start < aligned_end {
            let page_len = PAGE_SIZE.min(self.source.len().saturating_sub(page_start));
            let page = match self.page_cache.borrow().get(&page_start) {
                Some(p) => Some(p.clone()),
                None => None,
            };
            let page = match page {
                Some(p) => p,
                None => {
                    let mut buf = vec![0u8; page_len as usize];
                    self.source.read_at(page_start, &mut buf)?;
                    let rc: Rc<[u8]> = Rc::from(buf);
                    self.page_cache.borrow_mut().insert(page_start, rc.clone());
                    rc
                }
            };

            let page_abs_end = page_start + page.len() as u64;
            let lo = start.max(page_start);
            let hi = end.min(page_abs_end);
            if lo < hi {
                let rel_lo = (lo - page_start) as usize;
                let rel_hi = (hi - page_start) as usize;
                out.extend_from_slice(&page[rel_lo..rel_hi]);
            }
            page_start += PAGE_SIZE;
        }
        Ok(Rc::from(out))
    }

    /// Fetch a table's raw bytes, reading it in on first access if needed.
    /// Returns `Ok(None)` when `tag` is absent from the directory (not an
    /// error, per `spec.md` §4.2 "Mode gating").
    pub(crate) fn get_bytes(&self, tag: Tag) -> Result<Option<Rc<[u8]>>, ParserError> {
        if let Some(cached) = self.table_bytes.borrow().get(&tag) {
            return Ok(Some(cached.clone()));
        }
        let entry = match self.directory.iter().find(|e| e.tag == tag) {
            Some(e) => *e,
            None => return Ok(None),
        };
        let bytes = match self.strategy {
            ReadStrategy::Lazy => self.load_table_paged(&entry)?,
            _ => {
                let mut buf = vec![0u8; entry.length as usize];
                self.source
                    .read_at(self.base_offset + entry.offset as u64, &mut buf)?;
                Rc::from(buf)
            }
        };
        self.table_bytes.borrow_mut().insert(tag, bytes.clone());
        Ok(Some(bytes))
    }

    pub fn header(&self) -> OffsetTable {
        self.header
    }

    pub fn directory(&self) -> &[TableDirectoryEntry] {
        &self.directory
    }

    pub fn table_names(&self) -> Vec<Tag> {
        self.directory.iter().map(|e| e.tag).collect()
    }

    pub fn loading_mode(&self) -> LoadingMode {
        self.mode
    }

    /// The mode-gated typed accessor from `spec.md` §6:
    /// `font.table(tag) -> ParsedTable | Bytes | None`. Tables with no
    /// registered parser come back as `ParsedTable::Raw`.
    pub fn table(&self, tag: Tag) -> Result<Option<Rc<ParsedTable>>, ParserError> {
        if !self.directory.iter().any(|e| e.tag == tag) {
            return Ok(None);
        }
        if !self.mode.allows(tag) {
            return Err(ParserError::mode_restricted(tag).with_tag(tag));
        }
        if let Some(cached) = self.parsed_tables.borrow().get(&tag) {
            return Ok(Some(cached.clone()));
        }
        let bytes = self
            .get_bytes(tag)?
            .ok_or_else(|| ParserError::expected_table(tag))?;
        let parsed = crate::tables::parse_table(self, tag, &bytes)
            .map_err(|e| ParserError::from_table_parse_err(tag, e))?;
        let rc = Rc::new(parsed);
        self.parsed_tables.borrow_mut().insert(tag, rc.clone());
        Ok(Some(rc))
    }

    pub fn head(&self) -> Result<crate::tables::head::Head, ParserError> {
        match &*self
            .table(tags::HEAD)?
            .ok_or_else(|| ParserError::missing_required_table(tags::HEAD))?
        {
            ParsedTable::Head(h) => Ok(h.clone()),
            _ => unreachable!("registry dispatch for `head` is fixed"),
        }
    }

    pub fn hhea(&self) -> Result<crate::tables::hhea::Hhea, ParserError> {
        match &*self
            .table(tags::HHEA)?
            .ok_or_else(|| ParserError::missing_required_table(tags::HHEA))?
        {
            ParsedTable::Hhea(h) => Ok(h.clone()),
            _ => unreachable!("registry dispatch for `hhea` is fixed"),
        }
    }

    pub fn maxp(&self) -> Result<crate::tables::maxp::Maxp, ParserError> {
        match &*self
            .table(tags::MAXP)?
            .ok_or_else(|| ParserError::missing_required_table(tags::MAXP))?
        {
            ParsedTable::Maxp(m) => Ok(*m),
            _ => unreachable!("registry dispatch for `maxp` is fixed"),
        }
    }

    pub fn write_to(&self, sink: &mut dyn std::io::Write) -> Result<u64, ParserError> {
        crate::sfnt::writer::write_font(self, sink)
    }
}

impl OpentypeTableAccess for Font {
    fn table_data(&self, tag: Tag) -> Option<Rc<[u8]>> {
        self.get_bytes(tag).ok().flatten()
    }

    fn all_tables(&self) -> Vec<Tag> {
        self.table_names()
    }
}

/// A TTC/OTC collection (`spec.md` §3, §4.1).
#[derive(Debug)]
pub struct Collection {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_offsets: Vec<u32>,
    pub classification: CollectionKind,
    source: Rc<dyn ByteSource>,
    options: LoadOptions,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CollectionKind {
    Ttc,
    Otc,
}

impl Collection {
    pub(crate) fn new(
        major_version: u16,
        minor_version: u16,
        font_offsets: Vec<u32>,
        source: Rc<dyn ByteSource>,
        options: LoadOptions,
    ) -> Result<Self, ParserError> {
        let mut any_otto = false;
        for &offset in &font_offsets {
            let mut buf = [0u8; 4];
            source.read_at(offset as u64, &mut buf)?;
            let version = u32::from_be_bytes(buf);
            if version == crate::sfnt::SFNT_VERSION_OTTO {
                any_otto = true;
            }
        }
        let classification = if any_otto {
            CollectionKind::Otc
        } else {
            CollectionKind::Ttc
        };
        Ok(Collection {
            major_version,
            minor_version,
            font_offsets,
            classification,
            source,
            options,
        })
    }

    pub fn num_fonts(&self) -> usize {
        self.font_offsets.len()
    }

    pub fn font(&self, index: usize) -> Result<Font, ParserError> {
        let offset = *self
            .font_offsets
            .get(index)
            .ok_or_else(|| ParserError::font_not_found(index))?;
        Font::from_source(self.source.clone(), offset as u64, self.options)
    }
}
