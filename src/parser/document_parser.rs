//! Document reconstruction from a page source.

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Document, ImageRef, Metadata, Page, RawPage, Table, PAGE_SEPARATOR};

use super::layout::WordClusterer;
use super::options::ParseOptions;
use super::source::{JsonSource, PageSource};
use super::tables::TableNormalizer;

/// Rebuilds lines, sections and tables from a decoded document.
///
/// The parser owns its source; dropping the parser releases it.
pub struct DocumentParser<S: PageSource> {
    source: S,
    options: ParseOptions,
    clusterer: WordClusterer,
    normalizer: TableNormalizer,
}

impl DocumentParser<JsonSource> {
    /// Open a decoded page dump.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a decoded page dump with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        Ok(Self::with_options(JsonSource::open(path)?, options))
    }
}

impl<S: PageSource> DocumentParser<S> {
    /// Create a parser over any page source.
    pub fn new(source: S) -> Self {
        Self::with_options(source, ParseOptions::default())
    }

    /// Create a parser over any page source with custom options.
    pub fn with_options(source: S, options: ParseOptions) -> Self {
        Self {
            clusterer: WordClusterer::with_gaps(options.line_gap, options.section_gap),
            normalizer: TableNormalizer::with_header_mode(options.header_mode),
            source,
            options,
        }
    }

    /// Parsing options in effect.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Get the number of pages in the source.
    pub fn page_count(&self) -> u32 {
        self.source.page_count()
    }

    /// Parse the selected pages into a [`Document`].
    pub fn parse(&self) -> Result<Document> {
        let metadata = self.extract_metadata()?;
        let pages = self
            .selected_pages()
            .map(|n| self.extract_page(n))
            .collect::<Result<Vec<_>>>()?;
        let full_text = join_page_texts(&pages);

        log::debug!(
            "DocumentParser: parsed {} pages, {} chars of text",
            pages.len(),
            full_text.len()
        );

        Ok(Document {
            metadata,
            pages,
            full_text,
        })
    }

    /// Extract the document text.
    ///
    /// Page texts are joined by a blank line; pages without words are skipped.
    pub fn extract_text(&self) -> Result<String> {
        let mut texts = Vec::new();
        for number in self.selected_pages() {
            let raw = self.raw_page(number)?;
            if raw.words.is_empty() {
                continue;
            }
            texts.push(self.clusterer.page_text(&raw.words));
        }
        Ok(texts.join(PAGE_SEPARATOR))
    }

    /// Extract all accepted tables from the selected pages.
    pub fn extract_tables(&self) -> Result<Vec<Table>> {
        let mut tables = Vec::new();
        for number in self.selected_pages() {
            let raw = self.raw_page(number)?;
            tables.extend(self.normalizer.normalize_page(&raw.tables, number, raw.bbox()));
        }
        Ok(tables)
    }

    /// Extract image placements from the selected pages.
    pub fn extract_images(&self) -> Result<Vec<ImageRef>> {
        let mut images = Vec::new();
        for number in self.selected_pages() {
            images.extend(page_images(self.raw_page(number)?));
        }
        Ok(images)
    }

    /// Extract document metadata.
    pub fn extract_metadata(&self) -> Result<Metadata> {
        self.source.metadata()
    }

    /// Reconstruct a single page (1-indexed).
    ///
    /// Fails with [`Error::PageOutOfRange`] outside `[1, page_count]`.
    pub fn extract_page(&self, number: u32) -> Result<Page> {
        let raw = self.raw_page(number)?;

        let lines = self.clusterer.group_words_into_lines(&raw.words);
        let sections = self.clusterer.group_lines_into_sections(&lines);
        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let tables = self
            .normalizer
            .normalize_page(&raw.tables, number, raw.bbox());

        Ok(Page {
            page_number: number,
            width: raw.width,
            height: raw.height,
            text,
            sections,
            tables,
            images: page_images(raw),
        })
    }

    fn raw_page(&self, number: u32) -> Result<RawPage> {
        let total = self.page_count();
        if number == 0 || number > total {
            return Err(Error::PageOutOfRange(number, total));
        }
        self.source.page(number, &self.options.table_settings)
    }

    fn selected_pages(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.page_count()).filter(|n| self.options.pages.includes(*n))
    }
}

/// Join page texts with [`PAGE_SEPARATOR`], skipping pages with no text.
fn join_page_texts(pages: &[Page]) -> String {
    pages
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

fn page_images(raw: RawPage) -> Vec<ImageRef> {
    let number = raw.number;
    raw.images
        .into_iter()
        .map(|mut img| {
            img.page = number;
            img
        })
        .collect()
}
