//! # Lexical polarity scorer
//!
//! Deterministic, in-process sentiment scoring for free-text answers.
//!
//! Tokens are matched against a general-domain lexicon and the continuous
//! score is `(positives - negatives) / word_count`. The aggregation pipeline
//! buckets the score: above zero is Positive, below zero is Negative, exactly
//! zero is Neutral. Empty or whitespace-only text never reaches the scorer.
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

pub struct SentimentAnalyzer {
    positive_words: HashSet<&'static str>,
    negative_words: HashSet<&'static str>,
}

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self {
            positive_words: Self::build_positive_lexicon(),
            negative_words: Self::build_negative_lexicon(),
        }
    }

    /// Continuous polarity score for the text, 0.0 for empty input.
    pub fn score(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| !word.is_empty())
            .collect();

        if words.is_empty() {
            return 0.0;
        }

        let positives = words
            .iter()
            .filter(|word| self.positive_words.contains(*word))
            .count();
        let negatives = words
            .iter()
            .filter(|word| self.negative_words.contains(*word))
            .count();

        (positives as f64 - negatives as f64) / words.len() as f64
    }

    /// Bucketed classification of one answer cell.
    ///
    /// Whitespace-only answers are Neutral without scoring.
    pub fn classify(&self, text: &str) -> Polarity {
        if text.trim().is_empty() {
            return Polarity::Neutral;
        }

        let score = self.score(text);

        if score > 0.0 {
            Polarity::Positive
        } else if score < 0.0 {
            Polarity::Negative
        } else {
            Polarity::Neutral
        }
    }

    fn build_positive_lexicon() -> HashSet<&'static str> {
        [
            "good", "great", "excellent", "amazing", "awesome", "fantastic", "wonderful",
            "outstanding", "best", "better", "improved", "helpful", "supportive", "friendly",
            "satisfied", "satisfying", "enjoyable", "enjoyed", "love", "loved", "like", "liked",
            "useful", "practical", "engaging", "interesting", "clear", "organized", "accessible",
            "comfortable", "clean", "modern", "recommend", "recommended", "happy", "positive",
            "strong", "sufficient", "rich", "fun", "easy", "flexible", "welcoming",
        ]
        .into_iter()
        .collect()
    }

    fn build_negative_lexicon() -> HashSet<&'static str> {
        [
            "bad", "poor", "terrible", "awful", "horrible", "worst", "worse", "disappointing",
            "disappointed", "lacking", "insufficient", "inadequate", "outdated", "boring",
            "confusing", "unhelpful", "unfriendly", "dirty", "crowded", "noisy", "slow",
            "expensive", "stressful", "difficult", "hard", "hate", "hated", "dislike", "unfair",
            "broken", "limited", "negative", "unhappy", "weak", "frustrating", "frustrated",
            "overwhelming", "unprepared", "unavailable",
        ]
        .into_iter()
        .collect()
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
