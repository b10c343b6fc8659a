//! Scan results and per-page batch entries.

use crate::region::LocateStats;
use crate::sheet_layout::{Alphabet, SheetLayout};

/// Placeholder character for a row whose value could not be determined.
pub const UNKNOWN_SLOT: char = '-';

/// One recognized answer, 1-based question numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_number: usize,
    /// Selected option letter ('A'..).
    pub answer: char,
}

/// Full scan result for a single page.
///
/// `identifier` and `group` stay dense: unknown rows keep their
/// [`UNKNOWN_SLOT`] placeholder positionally, so a caller can render
/// "1-3-?-7...". `answers` is sparse by design: unknown rows are omitted
/// entirely.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetResult {
    /// Identifier digits, one character per expected row.
    pub identifier: String,
    /// Group digits, one character per expected row.
    pub group: String,
    /// Recognized answers sorted by question number.
    pub answers: Vec<AnswerEntry>,
    /// Index of the page within its batch.
    pub page_index: usize,
    /// Region-location diagnostics, if the location pass ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locate: Option<LocateStats>,
}

impl SheetResult {
    /// Construct an all-unknown result for a page whose reference frames
    /// could not be located.
    pub fn empty(layout: &SheetLayout, page_index: usize) -> Self {
        Self {
            identifier: UNKNOWN_SLOT.to_string().repeat(layout.identifier.rows),
            group: UNKNOWN_SLOT.to_string().repeat(layout.group.rows),
            answers: Vec::new(),
            page_index,
            locate: None,
        }
    }

    /// Compose per-region row values into the final result.
    pub(crate) fn assemble(
        layout: &SheetLayout,
        page_index: usize,
        identifier: &[Option<usize>],
        group: &[Option<usize>],
        answers: &[Option<usize>],
        locate: Option<LocateStats>,
    ) -> Self {
        Self {
            identifier: dense_string(identifier, &layout.identifier.alphabet),
            group: dense_string(group, &layout.group.alphabet),
            answers: sparse_answers(answers, &layout.answers.alphabet),
            page_index,
            locate,
        }
    }
}

/// Render row values densely, one character per row, unknowns as '-'.
fn dense_string(values: &[Option<usize>], alphabet: &Alphabet) -> String {
    values
        .iter()
        .map(|v| {
            v.and_then(|idx| alphabet.value_char(idx))
                .unwrap_or(UNKNOWN_SLOT)
        })
        .collect()
}

/// Render row values sparsely with 1-based question numbers, skipping
/// unknown rows.
fn sparse_answers(values: &[Option<usize>], alphabet: &Alphabet) -> Vec<AnswerEntry> {
    values
        .iter()
        .enumerate()
        .filter_map(|(row, v)| {
            let letter = v.and_then(|idx| alphabet.value_char(idx))?;
            Some(AnswerEntry {
                question_number: row + 1,
                answer: letter,
            })
        })
        .collect()
}

/// A page that failed before recognition could run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFailure {
    pub error: String,
    pub page_index: usize,
}

/// One batch entry: a scanned sheet or an isolated page failure.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PageEntry {
    Sheet(SheetResult),
    Failed(PageFailure),
}

impl PageEntry {
    /// The scanned sheet, if this entry succeeded.
    pub fn sheet(&self) -> Option<&SheetResult> {
        match self {
            PageEntry::Sheet(s) => Some(s),
            PageEntry::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_matches_layout_shape() {
        let layout = SheetLayout::default();
        let r = SheetResult::empty(&layout, 4);
        assert_eq!(r.identifier, "-------");
        assert_eq!(r.group, "---");
        assert!(r.answers.is_empty());
        assert_eq!(r.page_index, 4);
    }

    #[test]
    fn dense_string_keeps_unknowns_positional() {
        let values = [Some(1), None, Some(3), Some(7)];
        assert_eq!(dense_string(&values, &Alphabet::Digits), "1-37");
    }

    #[test]
    fn sparse_answers_skip_unknown_rows_and_number_from_one() {
        let values = [Some(0), Some(1), None, Some(3)];
        let answers = sparse_answers(&values, &Alphabet::Letters { count: 5 });
        assert_eq!(answers.len(), 3);
        assert_eq!(answers[0], AnswerEntry { question_number: 1, answer: 'A' });
        assert_eq!(answers[1], AnswerEntry { question_number: 2, answer: 'B' });
        assert_eq!(answers[2], AnswerEntry { question_number: 4, answer: 'D' });
    }

    #[test]
    fn out_of_alphabet_values_render_unknown() {
        let values = [Some(11)];
        assert_eq!(dense_string(&values, &Alphabet::Digits), "-");
        assert!(sparse_answers(&values, &Alphabet::Letters { count: 5 }).is_empty());
    }

    #[test]
    fn results_serialize_with_wire_field_names() {
        let layout = SheetLayout::default();
        let mut r = SheetResult::empty(&layout, 2);
        r.answers.push(AnswerEntry { question_number: 1, answer: 'C' });
        let json = serde_json::to_string(&r).expect("serialize");
        assert!(json.contains("\"pageIndex\":2"));
        assert!(json.contains("\"questionNumber\":1"));
        assert!(json.contains("\"answer\":\"C\""));
        assert!(!json.contains("locate"), "absent diagnostics are omitted");
    }

    #[test]
    fn batch_entries_serialize_flat() {
        let failed = PageEntry::Failed(PageFailure {
            error: "page conversion failed: boom".to_string(),
            page_index: 3,
        });
        let json = serde_json::to_string(&failed).expect("serialize");
        assert_eq!(json, r#"{"error":"page conversion failed: boom","pageIndex":3}"#);
    }
}
