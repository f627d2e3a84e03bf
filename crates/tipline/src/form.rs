//! Named addressing of questionnaire fields.
//!
//! The client renders questionnaire inputs under positional ids such as
//! `step-0-field-1-0-input-0` (step, row, column, input). Page objects
//! address them by name instead, through a [`FormLayout`]:
//!
//! ```text
//! FieldPath("details", "title", 0)
//!        │ step index 0    │ row 0, column 0  │ input 0
//!        ▼                 ▼                  ▼
//!   #step-0 >> #step-0-field-0-0-input-0
//! ```
//!
//! Names resolve to the first declaration with that name (declaration
//! order), mirroring the first-match rule of selectors.

use crate::result::{HarnessError, HarnessResult};
use crate::selector::Selector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Step holding the submission details
pub const DETAILS_STEP: &str = "details";
/// Title field of the details step
pub const TITLE_FIELD: &str = "title";
/// Free-text field of the details step
pub const DESCRIPTION_FIELD: &str = "description";
/// Attachment field of the details step
pub const ATTACHMENTS_FIELD: &str = "attachments";

/// Named address of a form input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    /// Step name
    pub step: String,
    /// Field name within the step
    pub field: String,
    /// Input index within the field
    pub input: usize,
}

impl FieldPath {
    /// Address the `input`-th input of `field` in `step`
    #[must_use]
    pub fn new(step: impl Into<String>, field: impl Into<String>, input: usize) -> Self {
        Self {
            step: step.into(),
            field: field.into(),
            input,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.step, self.field, self.input)
    }
}

/// Position of a field inside its step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    /// Field name
    pub name: String,
    /// Row of the field in the step grid
    pub row: usize,
    /// Column of the field in the step grid
    #[serde(default)]
    pub column: usize,
}

impl FieldLayout {
    /// Field at `row`, column 0
    #[must_use]
    pub fn new(name: impl Into<String>, row: usize) -> Self {
        Self {
            name: name.into(),
            row,
            column: 0,
        }
    }
}

/// Ordered fields of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLayout {
    /// Step name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldLayout>,
}

/// Ordered steps of the submission questionnaire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLayout {
    /// Steps in rendering order; the position is the step index
    pub steps: Vec<StepLayout>,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            steps: vec![StepLayout {
                name: DETAILS_STEP.to_string(),
                fields: vec![
                    FieldLayout::new(TITLE_FIELD, 0),
                    FieldLayout::new(DESCRIPTION_FIELD, 1),
                    FieldLayout::new(ATTACHMENTS_FIELD, 2),
                ],
            }],
        }
    }
}

impl FormLayout {
    /// Resolve a named path to positional coordinates
    pub fn resolve(&self, path: &FieldPath) -> HarnessResult<ResolvedField> {
        let unknown = || HarnessError::UnknownField {
            path: path.to_string(),
        };
        let (step_index, step) = self
            .steps
            .iter()
            .enumerate()
            .find(|(_, s)| s.name == path.step)
            .ok_or_else(unknown)?;
        let field = step
            .fields
            .iter()
            .find(|f| f.name == path.field)
            .ok_or_else(unknown)?;
        Ok(ResolvedField {
            step: step_index,
            row: field.row,
            column: field.column,
            input: path.input,
        })
    }
}

/// Positional coordinates of a form input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedField {
    /// Step index
    pub step: usize,
    /// Field row
    pub row: usize,
    /// Field column
    pub column: usize,
    /// Input index
    pub input: usize,
}

impl ResolvedField {
    /// Container of the whole step
    #[must_use]
    pub fn step_selector(&self) -> Selector {
        Selector::id(format!("step-{}", self.step))
    }

    /// Container of the field, scoped to its step
    #[must_use]
    pub fn field_selector(&self) -> Selector {
        self.step_selector().descendant(Selector::id(format!(
            "step-{}-field-{}-{}",
            self.step, self.row, self.column
        )))
    }

    /// The input itself, scoped to its step
    #[must_use]
    pub fn input_selector(&self) -> Selector {
        self.step_selector().descendant(Selector::id(format!(
            "step-{}-field-{}-{}-input-{}",
            self.step, self.row, self.column, self.input
        )))
    }

    /// The file input inside the field
    #[must_use]
    pub fn file_input_selector(&self) -> Selector {
        self.field_selector().descendant(Selector::file_input())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_default_layout_positions() {
            let layout = FormLayout::default();
            let title = layout
                .resolve(&FieldPath::new(DETAILS_STEP, TITLE_FIELD, 0))
                .unwrap();
            assert_eq!(
                title.input_selector(),
                Selector::id("step-0").descendant(Selector::id("step-0-field-0-0-input-0"))
            );
            let body = layout
                .resolve(&FieldPath::new(DETAILS_STEP, DESCRIPTION_FIELD, 0))
                .unwrap();
            assert_eq!(
                body.input_selector().to_string(),
                "#step-0 >> #step-0-field-1-0-input-0"
            );
        }

        #[test]
        fn test_file_input_selector() {
            let attachments = FormLayout::default()
                .resolve(&FieldPath::new(DETAILS_STEP, ATTACHMENTS_FIELD, 0))
                .unwrap();
            assert_eq!(
                attachments.file_input_selector().to_css().as_deref(),
                Some("#step-0 #step-0-field-2-0 input[type='file']")
            );
        }

        #[test]
        fn test_unknown_names() {
            let layout = FormLayout::default();
            let err = layout
                .resolve(&FieldPath::new("identity", TITLE_FIELD, 0))
                .unwrap_err();
            assert_eq!(err.to_string(), "Unknown form field: identity/title/0");
            assert!(layout
                .resolve(&FieldPath::new(DETAILS_STEP, "phone", 0))
                .is_err());
        }

        #[test]
        fn test_first_declaration_wins() {
            let layout = FormLayout {
                steps: vec![StepLayout {
                    name: "s".into(),
                    fields: vec![FieldLayout::new("dup", 4), FieldLayout::new("dup", 7)],
                }],
            };
            let resolved = layout.resolve(&FieldPath::new("s", "dup", 0)).unwrap();
            assert_eq!(resolved.row, 4);
        }

        #[test]
        fn test_layout_from_yaml() {
            let yaml = r"
steps:
  - name: receivers
    fields: []
  - name: details
    fields:
      - { name: title, row: 0 }
      - { name: notes, row: 3, column: 1 }
";
            let layout: FormLayout = serde_yaml_ng::from_str(yaml).unwrap();
            let notes = layout
                .resolve(&FieldPath::new("details", "notes", 2))
                .unwrap();
            assert_eq!(
                notes.input_selector().to_string(),
                "#step-1 >> #step-1-field-3-1-input-2"
            );
        }
    }

    proptest! {
        #[test]
        fn prop_resolved_ids_embed_coordinates(
            row in 0usize..50,
            column in 0usize..5,
            input in 0usize..5,
        ) {
            let layout = FormLayout {
                steps: vec![StepLayout {
                    name: "only".into(),
                    fields: vec![FieldLayout { name: "f".into(), row, column }],
                }],
            };
            let resolved = layout.resolve(&FieldPath::new("only", "f", input)).unwrap();
            let expected = format!("#step-0 >> #step-0-field-{row}-{column}-input-{input}");
            prop_assert_eq!(resolved.input_selector().to_string(), expected);
        }
    }
}
