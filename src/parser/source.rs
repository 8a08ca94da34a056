//! The decoder collaborator contract.
//!
//! A [`PageSource`] hands over already-decoded pages: words in reading order,
//! candidate tables, images and page size, plus document metadata. Byte-level
//! PDF decoding lives behind this trait and outside this crate.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{Metadata, RawDocument, RawPage};

use super::options::TableSettings;

/// A decoded document, one page at a time.
///
/// A source is acquired for a single document and released when dropped.
pub trait PageSource {
    /// Total number of pages.
    fn page_count(&self) -> u32;

    /// Decoded content of a page (1-indexed).
    ///
    /// `settings` configures the decoder's table finder.
    fn page(&self, number: u32, settings: &TableSettings) -> Result<RawPage>;

    /// Document metadata.
    fn metadata(&self) -> Result<Metadata>;
}

impl PageSource for RawDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page(&self, number: u32, _settings: &TableSettings) -> Result<RawPage> {
        let total = self.page_count();
        if number == 0 || number > total {
            return Err(Error::PageOutOfRange(number, total));
        }
        let mut page = self.pages[(number - 1) as usize].clone();
        page.number = number;
        Ok(page)
    }

    fn metadata(&self) -> Result<Metadata> {
        Ok(self.metadata.clone())
    }
}

/// A decoded page dump stored as JSON on disk.
///
/// The file holds a serialized [`RawDocument`]: `{"metadata": {..}, "pages": [..]}`.
#[derive(Debug)]
pub struct JsonSource {
    path: PathBuf,
    document: RawDocument,
}

impl JsonSource {
    /// Open a decoded page dump.
    ///
    /// Fails with [`Error::ResourceNotFound`] if the file does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ResourceNotFound(path.to_path_buf()));
        }

        let data = fs::read(path)?;
        let document: RawDocument = serde_json::from_slice(&data)
            .map_err(|e| Error::Decode(format!("{}: {}", path.display(), e)))?;

        log::debug!(
            "JsonSource: opened {} ({} pages)",
            path.display(),
            document.pages.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Parse a decoded page dump from a string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self {
            path: PathBuf::new(),
            document: serde_json::from_str(json)?,
        })
    }

    /// Path the dump was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageSource for JsonSource {
    fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    fn page(&self, number: u32, settings: &TableSettings) -> Result<RawPage> {
        self.document.page(number, settings)
    }

    fn metadata(&self) -> Result<Metadata> {
        self.document.metadata()
    }
}

impl Drop for JsonSource {
    fn drop(&mut self) {
        log::trace!("JsonSource: released {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DUMP: &str = r#"{
        "metadata": {"title": "Discharge Summary", "author": "Ward 3"},
        "pages": [
            {"number": 1, "width": 612, "height": 792,
             "words": [{"text": "BP:", "top": 100, "bottom": 110,
                        "bbox": {"x0": 10, "y0": 100, "x1": 30, "y1": 110}}]}
        ]
    }"#;

    #[test]
    fn test_open_missing_file() {
        let result = JsonSource::open("/nonexistent/dump.json");
        assert!(matches!(result, Err(Error::ResourceNotFound(_))));
    }

    #[test]
    fn test_open_dump() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DUMP.as_bytes()).unwrap();

        let source = JsonSource::open(file.path()).unwrap();
        assert_eq!(source.page_count(), 1);
        assert_eq!(source.path(), file.path());
        assert_eq!(
            source.metadata().unwrap().title.as_deref(),
            Some("Discharge Summary")
        );
        let page = source.page(1, &TableSettings::default()).unwrap();
        assert_eq!(page.words.len(), 1);
    }

    #[test]
    fn test_open_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"pages\": [").unwrap();
        assert!(matches!(
            JsonSource::open(file.path()),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_page_out_of_range() {
        let source = JsonSource::from_json_str(DUMP).unwrap();
        let settings = TableSettings::default();
        assert!(matches!(
            source.page(0, &settings),
            Err(Error::PageOutOfRange(0, 1))
        ));
        assert!(matches!(
            source.page(2, &settings),
            Err(Error::PageOutOfRange(2, 1))
        ));
    }
}
