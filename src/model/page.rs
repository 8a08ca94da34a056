//! Page-level types.

use serde::{Deserialize, Serialize};

use super::{BBox, RawTable, Section, Table, Word};

/// An image placement reported by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Page number (1-indexed)
    #[serde(default)]
    pub page: u32,
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
    /// Rendered width in points
    pub width: f32,
    /// Rendered height in points
    pub height: f32,
    /// Resource name of the image
    #[serde(default, rename = "type")]
    pub name: String,
}

/// One page as supplied by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Words in reading order
    #[serde(default)]
    pub words: Vec<Word>,
    /// Candidate tables found by the decoder's grid strategy
    #[serde(default)]
    pub tables: Vec<RawTable>,
    /// Images placed on the page
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl RawPage {
    /// Create an empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            ..Default::default()
        }
    }

    /// Create an empty page with standard Letter size (8.5 x 11 inches).
    pub fn letter(number: u32) -> Self {
        Self::new(number, 612.0, 792.0)
    }

    /// Bounding box of the whole page.
    pub fn bbox(&self) -> BBox {
        BBox::page(self.width, self.height)
    }
}

/// A reconstructed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Line text, one line per `\n`
    pub text: String,

    /// Coarse sections separated by wide vertical gaps
    pub sections: Vec<Section>,

    /// Accepted tables on this page
    pub tables: Vec<Table>,

    /// Images on this page
    pub images: Vec<ImageRef>,
}

impl Page {
    /// Create a new empty page with the given dimensions.
    pub fn new(page_number: u32, width: f32, height: f32) -> Self {
        Self {
            page_number,
            width,
            height,
            text: String::new(),
            sections: Vec::new(),
            tables: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Section bodies joined by blank lines.
    pub fn sectioned_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.body.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}
