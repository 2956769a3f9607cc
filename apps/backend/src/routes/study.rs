//! Generated tests and match boards

use axum::{
    extract::{Path, State},
    Json,
};
use flashcard_core::study::{generate_test, MatchGame};
use flashcard_core::types::Card;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::sets::load_set;
use crate::AppState;

async fn load_cards(state: &AppState, id: Uuid) -> Result<Vec<Card>> {
    load_set(state, id).await?;
    let cards: Vec<Card> = state
        .db
        .get_flashcards(id)
        .await?
        .iter()
        .map(DbFlashcard::to_core_card)
        .collect();

    if cards.is_empty() {
        return Err(ApiError::BadRequest("Study set has no flashcards".to_string()));
    }
    Ok(cards)
}

/// POST /api/sets/:id/test
pub async fn test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(config): Json<TestConfig>,
) -> Result<Json<GeneratedTestResponse>> {
    if config.question_count == 0 || config.question_types.is_empty() {
        return Err(ApiError::BadRequest(
            "Pick at least one question and one question type".to_string(),
        ));
    }
    let cards = load_cards(&state, id).await?;

    let questions = {
        let mut rng = rand::rng();
        generate_test(&cards, &config, &mut rng)
    };

    Ok(Json(GeneratedTestResponse {
        study_set_id: id,
        questions,
    }))
}

/// GET /api/sets/:id/match
pub async fn match_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchBoardResponse>> {
    let cards = load_cards(&state, id).await?;

    let game = {
        let mut rng = rand::rng();
        MatchGame::new(&cards, &mut rng)
    };

    Ok(Json(MatchBoardResponse {
        study_set_id: id,
        total_pairs: game.total_pairs(),
        tiles: game.tiles().to_vec(),
    }))
}
