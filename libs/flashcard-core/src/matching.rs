//! Lenient grading of written answers.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Fraction of key words that must appear in a long answer.
pub const KEY_WORD_THRESHOLD: f64 = 0.8;

/// Answers with at most this many words must match exactly.
const SHORT_ANSWER_WORDS: usize = 2;

/// Words longer than this count as key words.
const KEY_WORD_MIN_LEN: usize = 2;

const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '{', '}',
];

/// Result of grading a written answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// 1.0 for an exact match, otherwise the fraction of key words found
    /// (0.0 for short answers and answers without key words).
    pub match_ratio: f64,
    /// Normalized typed answer (for display).
    pub typed_normalized: String,
    /// Normalized correct answer (for display).
    pub correct_normalized: String,
    /// Character edits between the normalized answers.
    pub edit_distance: usize,
}

/// Normalize an answer for comparison.
///
/// Lowercases, trims, collapses whitespace, strips common punctuation and
/// folds accented letters to their base letter.
pub fn normalize_answer(input: &str) -> String {
    let lowered = input.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .nfd()
        .filter(|c| !is_diacritic(*c))
        .collect()
}

// Combining Diacritical Marks block only.
fn is_diacritic(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Grade a typed answer against the correct one.
pub fn grade_answer(typed: &str, correct: &str) -> MatchResult {
    let typed_normalized = normalize_answer(typed);
    let correct_normalized = normalize_answer(correct);

    let match_ratio = if typed_normalized == correct_normalized {
        1.0
    } else {
        key_word_ratio(&typed_normalized, &correct_normalized)
    };

    MatchResult {
        is_correct: match_ratio >= KEY_WORD_THRESHOLD,
        match_ratio,
        edit_distance: levenshtein_distance(&typed_normalized, &correct_normalized),
        typed_normalized,
        correct_normalized,
    }
}

/// Whether a typed answer should be graded correct.
pub fn compare_answers(typed: &str, correct: &str) -> bool {
    grade_answer(typed, correct).is_correct
}

/// Fraction of the correct answer's key words present anywhere in the typed
/// answer. Word order and repetition are ignored.
fn key_word_ratio(typed: &str, correct: &str) -> f64 {
    // Split on single spaces: punctuation stripping can leave empty words,
    // which still count towards the short-answer limit.
    let correct_words: Vec<&str> = correct.split(' ').collect();
    if correct_words.len() <= SHORT_ANSWER_WORDS {
        return 0.0;
    }

    let typed_words: std::collections::HashSet<&str> = typed.split(' ').collect();
    let key_words: Vec<&str> = correct_words
        .into_iter()
        .filter(|w| w.chars().count() > KEY_WORD_MIN_LEN)
        .collect();

    if key_words.is_empty() {
        return 0.0;
    }

    let matched = key_words.iter().filter(|w| typed_words.contains(*w)).count();
    matched as f64 / key_words.len() as f64
}

/// Case-insensitive equality used for multiple-choice and true/false answers.
pub fn answers_equal_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
