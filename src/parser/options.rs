//! Parsing options and configuration.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::layout::{LINE_GAP, SECTION_GAP};
use super::tables::TableHeaderMode;
use crate::error::{Error, Result};

/// Widest range allowed inside a comma-separated page list.
pub const MAX_LISTED_PAGES: u32 = 10_000;

/// Options for reconstructing a document from decoded pages.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Vertical gap (points) that starts a new line
    pub line_gap: f32,

    /// Vertical gap (points) that starts a new coarse section
    pub section_gap: f32,

    /// How the first row of each accepted table is treated
    pub header_mode: TableHeaderMode,

    /// Page selection (which pages to reconstruct)
    pub pages: PageSelection,

    /// Settings handed to the decoder's table finder
    pub table_settings: TableSettings,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the line gap threshold.
    pub fn with_line_gap(mut self, gap: f32) -> Self {
        self.line_gap = gap;
        self
    }

    /// Set the section gap threshold.
    pub fn with_section_gap(mut self, gap: f32) -> Self {
        self.section_gap = gap;
        self
    }

    /// Set table header mode.
    pub fn with_header_mode(mut self, mode: TableHeaderMode) -> Self {
        self.header_mode = mode;
        self
    }

    /// Use the first row of every table as its header.
    pub fn with_table_headers(mut self) -> Self {
        self.header_mode = TableHeaderMode::FirstRowAsHeader;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set decoder table settings.
    pub fn with_table_settings(mut self, settings: TableSettings) -> Self {
        self.table_settings = settings;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            line_gap: LINE_GAP,
            section_gap: SECTION_GAP,
            header_mode: TableHeaderMode::Raw,
            pages: PageSelection::All,
            table_settings: TableSettings::default(),
        }
    }
}

/// Strategy the decoder uses to find table edges along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStrategy {
    /// Infer edges from text positions
    #[default]
    Text,
    /// Use drawn lines only
    Lines,
}

/// Grid-detection settings passed through to the decoder.
///
/// None of these are interpreted here; they are part of the decoder contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Strategy for vertical edges
    pub vertical_strategy: EdgeStrategy,
    /// Strategy for horizontal edges
    pub horizontal_strategy: EdgeStrategy,
    /// Tolerance when intersecting edges (points)
    pub intersection_tolerance: f32,
    /// Tolerance when snapping edges to text (points)
    pub snap_tolerance: f32,
    /// Tolerance when joining collinear edges (points)
    pub join_tolerance: f32,
    /// Minimum edge length (points)
    pub edge_min_length: f32,
    /// Minimum words supporting a vertical edge
    pub min_words_vertical: u32,
    /// Minimum words supporting a horizontal edge
    pub min_words_horizontal: u32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            vertical_strategy: EdgeStrategy::Text,
            horizontal_strategy: EdgeStrategy::Text,
            intersection_tolerance: 3.0,
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            min_words_vertical: 3,
            min_words_horizontal: 3,
        }
    }
}

/// Page selection for reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let page = |p: &str| -> Result<u32> {
            p.trim()
                .parse()
                .map_err(|_| Error::InvalidPageRange(s.to_string()))
        };

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                return Ok(PageSelection::Range(page(start)?..=page(end)?));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (page(start)?, page(end)?);
                    if end.saturating_sub(start) >= MAX_LISTED_PAGES {
                        return Err(Error::InvalidPageRange(s.to_string()));
                    }
                    pages.extend(start..=end);
                }
                None => pages.push(page(part)?),
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}
