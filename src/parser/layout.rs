//! Layout reconstruction from positioned words.
//!
//! Words arrive in the decoder's reading order. A new line starts whenever a
//! word sits more than `line_gap` points below the top of the current line;
//! sections are built the same way from lines with the wider `section_gap`.
//! Both passes are pure functions of the input order and the thresholds.

use crate::model::{Line, Section, Word};

/// Vertical distance (points) that starts a new line.
pub const LINE_GAP: f32 = 5.0;

/// Vertical distance (points) that starts a new coarse section.
pub const SECTION_GAP: f32 = 10.0;

/// Groups words into lines and lines into sections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordClusterer {
    line_gap: f32,
    section_gap: f32,
}

impl WordClusterer {
    /// Create a clusterer with the default thresholds.
    pub fn new() -> Self {
        Self {
            line_gap: LINE_GAP,
            section_gap: SECTION_GAP,
        }
    }

    /// Create a clusterer with custom thresholds.
    pub fn with_gaps(line_gap: f32, section_gap: f32) -> Self {
        Self {
            line_gap,
            section_gap,
        }
    }

    /// Line threshold in points.
    pub fn line_gap(&self) -> f32 {
        self.line_gap
    }

    /// Section threshold in points.
    pub fn section_gap(&self) -> f32 {
        self.section_gap
    }

    /// Group words into lines.
    pub fn group_words_into_lines(&self, words: &[Word]) -> Vec<Line> {
        let lines: Vec<Line> = split_on_gap(words, self.line_gap, |w| w.top)
            .into_iter()
            .map(Line::from_words)
            .collect();

        log::debug!(
            "WordClusterer: {} words -> {} lines (gap {:.1})",
            words.len(),
            lines.len(),
            self.line_gap
        );
        lines
    }

    /// Group lines into coarse sections.
    ///
    /// Section bodies are the member lines joined by single spaces. A section
    /// of two or more lines whose first line ends in `:` takes that line as
    /// its heading; the body still includes it.
    pub fn group_lines_into_sections(&self, lines: &[Line]) -> Vec<Section> {
        split_on_gap(lines, self.section_gap, |l| l.top)
            .into_iter()
            .map(|group| {
                let body = group
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                match group {
                    [first, _, ..] => match first.text.trim().strip_suffix(':') {
                        Some(heading) if !heading.trim().is_empty() => {
                            Section::titled(heading.trim(), body)
                        }
                        _ => Section::untitled(body),
                    },
                    _ => Section::untitled(body),
                }
            })
            .collect()
    }

    /// Page text: line texts joined by newlines.
    pub fn page_text(&self, words: &[Word]) -> String {
        self.group_words_into_lines(words)
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for WordClusterer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `items` into runs, starting a new run when an item's top is more
/// than `gap` below the top of the current run.
///
/// Only downward movement counts: an item above the current run joins it.
fn split_on_gap<T>(items: &[T], gap: f32, top: impl Fn(&T) -> f32) -> Vec<&[T]> {
    let Some(first) = items.first() else {
        return vec![];
    };

    let mut runs = Vec::new();
    let mut start = 0;
    let mut current_y = top(first);

    for (i, item) in items.iter().enumerate() {
        let y = top(item);
        if y - current_y > gap {
            runs.push(&items[start..i]);
            start = i;
            current_y = y;
        }
    }
    runs.push(&items[start..]);

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: f32, top: f32) -> Word {
        Word::new(text, x, top, x + 30.0, top + 10.0)
    }

    #[test]
    fn test_empty_input() {
        let clusterer = WordClusterer::new();
        assert!(clusterer.group_words_into_lines(&[]).is_empty());
        assert!(clusterer.group_lines_into_sections(&[]).is_empty());
        assert_eq!(clusterer.page_text(&[]), "");
    }

    #[test]
    fn test_single_word() {
        let lines = WordClusterer::new().group_words_into_lines(&[word("Hello", 10.0, 50.0)]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello");
    }

    #[test]
    fn test_large_gap_splits_lines() {
        let words = vec![word("first", 10.0, 100.0), word("second", 10.0, 200.0)];
        let lines = WordClusterer::new().group_words_into_lines(&words);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[1].text, "second");
    }

    #[test]
    fn test_small_gap_merges_line() {
        let words = vec![word("same", 10.0, 100.0), word("line", 50.0, 102.0)];
        let lines = WordClusterer::new().group_words_into_lines(&words);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "same line");
    }

    #[test]
    fn test_gap_equal_to_threshold_merges() {
        let words = vec![word("a", 10.0, 100.0), word("b", 50.0, 105.0)];
        assert_eq!(WordClusterer::new().group_words_into_lines(&words).len(), 1);
    }

    #[test]
    fn test_upward_word_stays_on_line() {
        let words = vec![word("low", 10.0, 100.0), word("high", 50.0, 40.0)];
        let lines = WordClusterer::new().group_words_into_lines(&words);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "low high");
    }

    #[test]
    fn test_reference_y_resets_per_line() {
        // The gap is measured from the first word of the line, not the
        // previous word.
        let words = vec![
            word("a", 10.0, 100.0),
            word("b", 10.0, 104.0),
            word("c", 10.0, 108.0),
            word("d", 10.0, 112.0),
        ];
        let lines = WordClusterer::new().group_words_into_lines(&words);
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a b", "c d"]);
    }

    #[test]
    fn test_idempotent() {
        let words = vec![
            word("Patient", 10.0, 100.0),
            word("ID:", 60.0, 100.5),
            word("A-123", 90.0, 101.0),
            word("BP:", 10.0, 120.0),
            word("120/80", 40.0, 120.0),
        ];
        let clusterer = WordClusterer::new();
        let first = clusterer.group_words_into_lines(&words);
        let second = clusterer.group_words_into_lines(&words);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sections_use_wider_gap() {
        let words = vec![
            word("Diagnosis", 10.0, 100.0),
            word("Hypertension", 10.0, 108.0),
            word("Medications", 10.0, 140.0),
        ];
        let clusterer = WordClusterer::new();
        let lines = clusterer.group_words_into_lines(&words);
        assert_eq!(lines.len(), 3);

        let sections = clusterer.group_lines_into_sections(&lines);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "Diagnosis Hypertension");
        assert_eq!(sections[1].body, "Medications");
        assert!(sections[0].heading.is_none());
    }

    #[test]
    fn test_section_heading_from_colon_line() {
        let words = vec![
            word("Plan:", 10.0, 100.0),
            word("Rest", 10.0, 108.0),
            word("Follow-up:", 10.0, 140.0),
        ];
        let clusterer = WordClusterer::new();
        let lines = clusterer.group_words_into_lines(&words);
        let sections = clusterer.group_lines_into_sections(&lines);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading.as_deref(), Some("Plan"));
        assert_eq!(sections[0].body, "Plan: Rest");
        assert!(sections[1].heading.is_none());
    }

    #[test]
    fn test_custom_gaps() {
        let words = vec![word("a", 10.0, 100.0), word("b", 10.0, 103.0)];
        let clusterer = WordClusterer::with_gaps(2.0, 4.0);
        assert_eq!(clusterer.group_words_into_lines(&words).len(), 2);
        assert_eq!(clusterer.line_gap(), 2.0);
        assert_eq!(clusterer.section_gap(), 4.0);
    }

    #[test]
    fn test_page_text_joins_lines() {
        let words = vec![
            word("BP:", 10.0, 100.0),
            word("120/80", 40.0, 100.0),
            word("HR:", 10.0, 120.0),
            word("72", 40.0, 120.0),
        ];
        assert_eq!(WordClusterer::new().page_text(&words), "BP: 120/80\nHR: 72");
    }
}
