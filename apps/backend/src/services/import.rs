//! CSV import for study sets.

use flashcard_core::{parse_csv, FlashcardInput};

use crate::error::ApiError;

/// Cards accepted from an upload plus the rejected lines.
#[derive(Debug)]
pub struct ImportPlan {
    pub flashcards: Vec<FlashcardInput>,
    pub errors: Vec<String>,
}

/// Parse uploaded CSV. Fails when no line yields a card.
pub fn plan_import(content: &str) -> Result<ImportPlan, ApiError> {
    let parsed = parse_csv(content);
    if !parsed.success {
        return Err(ApiError::Import(parsed.errors));
    }

    Ok(ImportPlan {
        flashcards: parsed.flashcards,
        errors: parsed.errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_import_keeps_errors() {
        let plan = plan_import("term,definition\nhola,hello\n,missing\n").unwrap();
        assert_eq!(plan.flashcards, vec![FlashcardInput::new("hola", "hello")]);
        assert_eq!(plan.errors, vec!["Line 3: Term is empty".to_string()]);
    }

    #[test]
    fn test_empty_upload_is_rejected() {
        let err = plan_import("").unwrap_err();
        assert_eq!(err.to_string(), "Import failed: no flashcards found in CSV");
    }

    #[test]
    fn test_all_invalid_lines_are_reported() {
        match plan_import("only-one-column\nx,\n").unwrap_err() {
            ApiError::Import(errors) => assert_eq!(
                errors,
                vec![
                    "Line 1: Expected at least 2 columns (term, definition)".to_string(),
                    "Line 2: Definition is empty".to_string(),
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
}
