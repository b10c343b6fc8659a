//! Runtime sheet layout specification.
//!
//! Layout JSON follows a parametric schema (`markgrid.sheet.v1`): the three
//! answer regions are described by row/column counts and option counts, not
//! by per-bubble coordinate lists. Bubble positions are recovered from the
//! scan itself, so the layout only has to agree with the printed sheet on
//! the logical grid shape.

use std::path::Path;

const SHEET_SCHEMA_V1: &str = "markgrid.sheet.v1";

const DEFAULT_NAME: &str = "markgrid_letter_20q";
const DEFAULT_IDENTIFIER_ROWS: usize = 7;
const DEFAULT_GROUP_ROWS: usize = 3;
const DEFAULT_DIGIT_OPTIONS: usize = 10;
const DEFAULT_QUESTIONS: usize = 20;
const DEFAULT_ANSWER_OPTIONS: usize = 5;

/// The three rectangular reference regions on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Student identifier digit block (top left).
    Identifier,
    /// Group digit block (top right).
    Group,
    /// Question/answer block (bottom).
    AnswerBlock,
}

/// Value alphabet a region's columns map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alphabet {
    /// Column index 0–9 maps to the digit characters '0'–'9'.
    Digits,
    /// Column index maps to 'A', 'B', ... up to `count` options.
    Letters { count: usize },
}

impl Alphabet {
    /// Number of values in the alphabet.
    pub fn len(&self) -> usize {
        match *self {
            Alphabet::Digits => 10,
            Alphabet::Letters { count } => count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Character for a column index, or `None` when out of range.
    pub fn value_char(&self, index: usize) -> Option<char> {
        if index >= self.len() {
            return None;
        }
        match *self {
            Alphabet::Digits => char::from_digit(index as u32, 10),
            Alphabet::Letters { .. } => Some((b'A' + index as u8) as char),
        }
    }
}

/// Logical rows × columns structure of one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub cols: usize,
    pub alphabet: Alphabet,
}

/// Runtime sheet layout used by the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub name: String,
    pub identifier: GridSpec,
    pub group: GridSpec,
    pub answers: GridSpec,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetLayoutSpecV1 {
    schema: String,
    name: String,
    identifier_rows: usize,
    group_rows: usize,
    digit_options: usize,
    questions: usize,
    answer_options: usize,
}

impl SheetLayout {
    /// Default layout with a custom question count.
    pub fn with_questions(questions: usize) -> Self {
        let mut layout = Self::default();
        layout.answers.rows = questions;
        layout
    }

    /// Grid configuration for one region kind.
    pub fn grid(&self, kind: RegionKind) -> &GridSpec {
        match kind {
            RegionKind::Identifier => &self.identifier,
            RegionKind::Group => &self.group,
            RegionKind::AnswerBlock => &self.answers,
        }
    }

    /// Load a sheet layout from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let spec: SheetLayoutSpecV1 = serde_json::from_str(&data)?;
        Self::from_layout_spec(spec).map_err(Into::into)
    }

    fn from_layout_spec(spec: SheetLayoutSpecV1) -> Result<Self, String> {
        if spec.schema != SHEET_SCHEMA_V1 {
            return Err(format!(
                "unsupported sheet schema '{}' (expected '{}')",
                spec.schema, SHEET_SCHEMA_V1
            ));
        }

        validate_layout_spec(&spec)?;

        Ok(Self {
            name: spec.name,
            identifier: GridSpec {
                rows: spec.identifier_rows,
                cols: spec.digit_options,
                alphabet: Alphabet::Digits,
            },
            group: GridSpec {
                rows: spec.group_rows,
                cols: spec.digit_options,
                alphabet: Alphabet::Digits,
            },
            answers: GridSpec {
                rows: spec.questions,
                cols: spec.answer_options,
                alphabet: Alphabet::Letters {
                    count: spec.answer_options,
                },
            },
        })
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        let spec = SheetLayoutSpecV1 {
            schema: SHEET_SCHEMA_V1.to_string(),
            name: DEFAULT_NAME.to_string(),
            identifier_rows: DEFAULT_IDENTIFIER_ROWS,
            group_rows: DEFAULT_GROUP_ROWS,
            digit_options: DEFAULT_DIGIT_OPTIONS,
            questions: DEFAULT_QUESTIONS,
            answer_options: DEFAULT_ANSWER_OPTIONS,
        };

        Self::from_layout_spec(spec).expect("default sheet spec must be valid")
    }
}

fn validate_layout_spec(spec: &SheetLayoutSpecV1) -> Result<(), String> {
    if spec.name.trim().is_empty() {
        return Err("sheet name must not be empty".to_string());
    }

    if spec.identifier_rows == 0 {
        return Err("identifier_rows must be >= 1".to_string());
    }

    if spec.group_rows == 0 {
        return Err("group_rows must be >= 1".to_string());
    }

    if spec.questions == 0 {
        return Err("questions must be >= 1".to_string());
    }

    if spec.digit_options < 2 || spec.digit_options > 10 {
        return Err("digit_options must be in 2..=10".to_string());
    }

    if spec.answer_options < 2 || spec.answer_options > 26 {
        return Err("answer_options must be in 2..=26".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_has_expected_shape() {
        let layout = SheetLayout::default();
        assert_eq!(layout.identifier.rows, 7);
        assert_eq!(layout.identifier.cols, 10);
        assert_eq!(layout.group.rows, 3);
        assert_eq!(layout.answers.rows, 20);
        assert_eq!(layout.answers.cols, 5);
        assert_eq!(layout.answers.alphabet, Alphabet::Letters { count: 5 });
    }

    #[test]
    fn grid_lookup_matches_fields() {
        let layout = SheetLayout::with_questions(12);
        assert_eq!(layout.grid(RegionKind::Identifier), &layout.identifier);
        assert_eq!(layout.grid(RegionKind::Group), &layout.group);
        assert_eq!(layout.grid(RegionKind::AnswerBlock).rows, 12);
    }

    #[test]
    fn alphabet_value_chars() {
        assert_eq!(Alphabet::Digits.value_char(0), Some('0'));
        assert_eq!(Alphabet::Digits.value_char(9), Some('9'));
        assert_eq!(Alphabet::Digits.value_char(10), None);
        let letters = Alphabet::Letters { count: 5 };
        assert_eq!(letters.value_char(0), Some('A'));
        assert_eq!(letters.value_char(4), Some('E'));
        assert_eq!(letters.value_char(5), None);
    }

    #[test]
    fn from_json_requires_v1_schema() {
        let raw = r#"{
            "schema":"markgrid.sheet.v0",
            "name":"x",
            "identifier_rows":7,
            "group_rows":3,
            "digit_options":10,
            "questions":20,
            "answer_options":5
        }"#;
        let spec: SheetLayoutSpecV1 = serde_json::from_str(raw).expect("valid json");
        let err = SheetLayout::from_layout_spec(spec).expect_err("expected error");
        assert!(err.contains("unsupported sheet schema"));
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let raw = r#"{
            "schema":"markgrid.sheet.v1",
            "name":"x",
            "identifier_rows":7,
            "group_rows":3,
            "digit_options":10,
            "questions":20,
            "answer_options":5,
            "bubbles":[]
        }"#;
        let parsed: Result<SheetLayoutSpecV1, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn validation_rejects_degenerate_grids() {
        let mut spec = SheetLayoutSpecV1 {
            schema: SHEET_SCHEMA_V1.to_string(),
            name: "x".to_string(),
            identifier_rows: 7,
            group_rows: 3,
            digit_options: 10,
            questions: 20,
            answer_options: 5,
        };
        spec.questions = 0;
        assert!(SheetLayout::from_layout_spec(spec.clone()).is_err());
        spec.questions = 20;
        spec.answer_options = 1;
        assert!(SheetLayout::from_layout_spec(spec.clone()).is_err());
        spec.answer_options = 27;
        assert!(SheetLayout::from_layout_spec(spec).is_err());
    }
}
