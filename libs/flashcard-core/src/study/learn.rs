//! Multiple-choice learn mode.
//!
//! The queue holds every card that is not mastered yet. Answering pops the
//! front card; a wrong answer sends it to the back of the queue.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::DISTRACTOR_COUNT;
use crate::progress::{next_state, LearnProgress, MasteryStatus, ProgressCounters};
use crate::shuffle::{random_items_excluding, shuffle};
use crate::types::Card;

/// A card together with the user's progress on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnCard {
    pub card: Card,
    pub progress: Option<ProgressCounters>,
}

impl LearnCard {
    pub fn new(card: Card, progress: Option<ProgressCounters>) -> Self {
        Self { card, progress }
    }

    pub fn status(&self) -> MasteryStatus {
        MasteryStatus::of(self.progress.as_ref())
    }
}

/// A multiple-choice question for the card at the front of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnQuestion {
    pub card_id: String,
    pub term: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl LearnQuestion {
    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

/// Local learn mode state.
#[derive(Debug, Clone)]
pub struct LearnSession {
    cards: Vec<LearnCard>,
    queue: VecDeque<usize>,
}

impl LearnSession {
    pub fn new<R: Rng + ?Sized>(cards: Vec<LearnCard>, rng: &mut R) -> Self {
        let pending: Vec<usize> = cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.status() != MasteryStatus::Mastered)
            .map(|(idx, _)| idx)
            .collect();

        Self {
            queue: shuffle(&pending, rng).into(),
            cards,
        }
    }

    pub fn cards(&self) -> &[LearnCard] {
        &self.cards
    }

    pub fn current(&self) -> Option<&LearnCard> {
        self.queue.front().map(|&idx| &self.cards[idx])
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn progress(&self) -> LearnProgress {
        LearnProgress::tally(self.cards.iter().map(|c| c.progress.map(|p| p.status)))
    }

    /// Build a question for the current card with up to three distractors.
    pub fn question<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<LearnQuestion> {
        let current = self.current()?;
        let definitions: Vec<String> = self.cards.iter().map(|c| c.card.definition.clone()).collect();

        let mut options = random_items_excluding(
            &definitions,
            DISTRACTOR_COUNT,
            std::slice::from_ref(&current.card.definition),
            rng,
        );
        options.push(current.card.definition.clone());
        let options = shuffle(&options, rng);

        let correct_index = options
            .iter()
            .position(|o| *o == current.card.definition)
            .unwrap_or_default();

        Some(LearnQuestion {
            card_id: current.card.id.clone(),
            term: current.card.term.clone(),
            options,
            correct_index,
        })
    }

    /// Record an answer for the current card.
    ///
    /// Returns the predicted counters, which the caller persists. `None` when
    /// the session is already complete.
    pub fn answer(&mut self, correct: bool) -> Option<ProgressCounters> {
        let idx = self.queue.pop_front()?;
        let entry = &mut self.cards[idx];
        let next = next_state(entry.progress.as_ref(), correct);
        entry.progress = Some(next);

        if !correct {
            self.queue.push_back(idx);
        }
        Some(next)
    }

    /// Forget all local progress and queue every card again.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for entry in &mut self.cards {
            entry.progress = None;
        }
        let all: Vec<usize> = (0..self.cards.len()).collect();
        self.queue = shuffle(&all, rng).into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cards(n: usize) -> Vec<LearnCard> {
        (0..n)
            .map(|i| LearnCard::new(Card::new(i.to_string(), format!("term {i}"), format!("def {i}")), None))
            .collect()
    }

    fn mastered() -> Option<ProgressCounters> {
        Some(ProgressCounters {
            correct_count: 1,
            incorrect_count: 0,
            status: MasteryStatus::Mastered,
        })
    }

    #[test]
    fn queue_skips_mastered_cards() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut set = cards(4);
        set[1].progress = mastered();
        set[3].progress = mastered();

        let session = LearnSession::new(set, &mut rng);
        assert_eq!(session.remaining(), 2);
        let progress = session.progress();
        assert_eq!(progress.mastered, 2);
        assert_eq!(progress.new, 2);
    }

    #[test]
    fn all_mastered_is_complete() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut set = cards(2);
        set[0].progress = mastered();
        set[1].progress = mastered();
        let session = LearnSession::new(set, &mut rng);
        assert!(session.is_complete());
        assert!(session.question(&mut rng).is_none());
    }

    #[test]
    fn question_has_answer_and_distinct_distractors() {
        let mut rng = StdRng::seed_from_u64(42);
        let session = LearnSession::new(cards(6), &mut rng);
        let question = session.question(&mut rng).unwrap();
        let current = session.current().unwrap();

        assert_eq!(question.options.len(), 4);
        assert_eq!(question.options[question.correct_index], current.card.definition);
        assert_eq!(question.term, current.card.term);
        let occurrences = question
            .options
            .iter()
            .filter(|o| **o == current.card.definition)
            .count();
        assert_eq!(occurrences, 1);
    }

    #[test]
    fn question_with_single_card_has_one_option() {
        let mut rng = StdRng::seed_from_u64(2);
        let session = LearnSession::new(cards(1), &mut rng);
        let question = session.question(&mut rng).unwrap();
        assert_eq!(question.options, vec!["def 0".to_string()]);
        assert!(question.is_correct(0));
    }

    #[test]
    fn correct_first_answer_masters_and_dequeues() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = LearnSession::new(cards(2), &mut rng);
        let next = session.answer(true).unwrap();
        assert_eq!(next.status, MasteryStatus::Mastered);
        assert_eq!(session.remaining(), 1);
        assert_eq!(session.progress().mastered, 1);
    }

    #[test]
    fn wrong_answer_requeues_card_at_back() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = LearnSession::new(cards(3), &mut rng);
        let first_id = session.current().unwrap().card.id.clone();

        let next = session.answer(false).unwrap();
        assert_eq!(next.status, MasteryStatus::Learning);
        assert_eq!(session.remaining(), 3);
        assert_ne!(session.current().unwrap().card.id, first_id);

        session.answer(true);
        session.answer(true);
        assert_eq!(session.current().unwrap().card.id, first_id);

        // One miss then one hit is not enough to master.
        let next = session.answer(true).unwrap();
        assert_eq!(next.status, MasteryStatus::Learning);
        assert!(session.is_complete());
        assert!(session.answer(true).is_none());
    }

    #[test]
    fn restart_clears_progress() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut set = cards(3);
        set[0].progress = mastered();
        let mut session = LearnSession::new(set, &mut rng);
        session.answer(true);

        session.restart(&mut rng);
        assert_eq!(session.remaining(), 3);
        assert_eq!(session.progress().new, 3);
    }
}
