//! Positioned words and the text units built from them.

use serde::{Deserialize, Serialize};

/// Bounding box of a layout element in page coordinates (points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Bounding box covering a whole page.
    pub fn page(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A word emitted by the decoder, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// The word text
    pub text: String,
    /// Distance from the top of the page to the top of the word
    pub top: f32,
    /// Distance from the top of the page to the bottom of the word
    pub bottom: f32,
    /// Bounding box
    pub bbox: BBox,
}

impl Word {
    /// Create a word at the given vertical position.
    ///
    /// The bounding box is derived from `x0`/`x1` and the vertical extent.
    pub fn new(text: impl Into<String>, x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self {
            text: text.into(),
            top,
            bottom,
            bbox: BBox::new(x0, top, x1, bottom),
        }
    }

    /// Height of the word box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// A reconstructed line of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Word texts joined by single spaces
    pub text: String,
    /// Top of the first word of the line
    pub top: f32,
    /// Largest bottom of any word on the line
    pub bottom: f32,
}

impl Line {
    /// Build a line from the words that belong to it.
    pub fn from_words(words: &[Word]) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let top = words.first().map(|w| w.top).unwrap_or(0.0);
        let bottom = words.iter().map(|w| w.bottom).fold(top, f32::max);

        Self { text, top, bottom }
    }

    /// Check if the line has no text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A block of text with an optional heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text, if one was detected
    pub heading: Option<String>,
    /// Section body
    pub body: String,
}

impl Section {
    /// Create a section without a heading.
    pub fn untitled(body: impl Into<String>) -> Self {
        Self {
            heading: None,
            body: body.into(),
        }
    }

    /// Create a section with a heading.
    pub fn titled(heading: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            heading: Some(heading.into()),
            body: body.into(),
        }
    }
}
