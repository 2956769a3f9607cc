//! Timed term/definition matching game.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::shuffle::{random_items, shuffle};
use crate::types::{Card, MatchTile, TileKind};

/// Maximum number of pairs on a board.
pub const MAX_MATCH_PAIRS: usize = 6;

/// Time added for each wrong pairing.
pub const MISMATCH_PENALTY_MS: u64 = 1000;

/// Result of selecting a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Tile is matched, unknown, or the game is over.
    Ignored,
    Selected,
    Deselected,
    Matched { complete: bool },
    /// The two tiles belong to different cards.
    Mismatch { first: String, second: String },
}

/// Board state of one match game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchGame {
    tiles: Vec<MatchTile>,
    selected: Option<usize>,
    matched_pairs: usize,
    mistakes: u32,
    penalty_ms: u64,
}

impl MatchGame {
    /// Deal a new board from up to six random cards.
    pub fn new<R: Rng + ?Sized>(cards: &[Card], rng: &mut R) -> Self {
        let picked = random_items(cards, MAX_MATCH_PAIRS, rng);
        let mut tiles = Vec::with_capacity(picked.len() * 2);

        for card in picked {
            tiles.push(MatchTile {
                id: format!("term-{}", card.id),
                card_id: card.id.clone(),
                content: card.term,
                kind: TileKind::Term,
                is_matched: false,
                is_selected: false,
            });
            tiles.push(MatchTile {
                id: format!("def-{}", card.id),
                card_id: card.id,
                content: card.definition,
                kind: TileKind::Definition,
                is_matched: false,
                is_selected: false,
            });
        }

        Self {
            tiles: shuffle(&tiles, rng),
            selected: None,
            matched_pairs: 0,
            mistakes: 0,
            penalty_ms: 0,
        }
    }

    pub fn tiles(&self) -> &[MatchTile] {
        &self.tiles
    }

    pub fn total_pairs(&self) -> usize {
        self.tiles.len() / 2
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn penalty_ms(&self) -> u64 {
        self.penalty_ms
    }

    pub fn is_complete(&self) -> bool {
        self.matched_pairs == self.total_pairs()
    }

    /// Final time for a game that took `elapsed_ms`, penalties included.
    pub fn final_time_ms(&self, elapsed_ms: u64) -> u64 {
        elapsed_ms + self.penalty_ms
    }

    /// Handle a click on a tile.
    pub fn select(&mut self, tile_id: &str) -> MatchOutcome {
        if self.is_complete() {
            return MatchOutcome::Ignored;
        }
        let Some(idx) = self.tiles.iter().position(|t| t.id == tile_id) else {
            return MatchOutcome::Ignored;
        };
        if self.tiles[idx].is_matched {
            return MatchOutcome::Ignored;
        }

        match self.selected {
            None => {
                self.tiles[idx].is_selected = true;
                self.selected = Some(idx);
                MatchOutcome::Selected
            }
            Some(prev) if prev == idx => {
                self.tiles[idx].is_selected = false;
                self.selected = None;
                MatchOutcome::Deselected
            }
            Some(prev) => {
                self.selected = None;
                let card_id = self.tiles[idx].card_id.clone();

                if self.tiles[prev].card_id == card_id {
                    for tile in self.tiles.iter_mut().filter(|t| t.card_id == card_id) {
                        tile.is_matched = true;
                        tile.is_selected = false;
                    }
                    self.matched_pairs += 1;
                    MatchOutcome::Matched {
                        complete: self.is_complete(),
                    }
                } else {
                    self.tiles[prev].is_selected = false;
                    self.mistakes += 1;
                    self.penalty_ms += MISMATCH_PENALTY_MS;
                    MatchOutcome::Mismatch {
                        first: self.tiles[prev].id.clone(),
                        second: self.tiles[idx].id.clone(),
                    }
                }
            }
        }
    }
}
