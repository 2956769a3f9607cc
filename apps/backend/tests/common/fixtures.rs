//! Request bodies for integration tests.

use serde_json::json;
use uuid::Uuid;

/// Spanish vocabulary used across tests.
pub const SPANISH: &[(&str, &str)] = &[
    ("perro", "dog"),
    ("gato", "cat"),
    ("casa", "house"),
    ("libro", "book"),
];

/// CSV with a header, two good rows and one bad row.
pub fn sample_csv() -> String {
    "term,definition\nsol,sun\n,missing term\n\"agua, fría\",cold water\n".to_string()
}

pub fn register_request(name: Option<&str>) -> serde_json::Value {
    match name {
        Some(n) => json!({ "name": n }),
        None => json!({}),
    }
}

pub fn create_set_request(title: &str, cards: &[(&str, &str)]) -> serde_json::Value {
    let flashcards: Vec<_> = cards
        .iter()
        .map(|(term, definition)| json!({ "term": term, "definition": definition }))
        .collect();
    json!({ "title": title, "description": "fixture", "flashcards": flashcards })
}

pub fn answer_request(flashcard_id: Uuid, correct: bool) -> serde_json::Value {
    json!({ "flashcard_id": flashcard_id, "correct": correct })
}

pub fn mark_request(flashcard_id: Uuid, status: &str) -> serde_json::Value {
    json!({ "flashcard_id": flashcard_id, "status": status })
}

pub fn test_result_request(study_set_id: Uuid, score: i32, total: i32) -> serde_json::Value {
    let percentage = (score as f64 * 100.0 / total as f64).round() as i32;
    json!({
        "study_set_id": study_set_id,
        "score": score,
        "total_questions": total,
        "percentage": percentage,
        "question_types": { "written": total },
        "answers": [],
    })
}
