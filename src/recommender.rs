//! Recommendation engine
//!
//! CLASSIFY → QUERY → SEARCH → DEDUPE → PICK → PHRASE → REPLY

use crate::classifier::{Category, KeywordClassifier};
use crate::config::DEFAULT_MAX_RESULTS;
use crate::models::Candidate;
use crate::phrases::PhraseBank;
use crate::search::VideoSearch;
use crate::state::Session;
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

const QUERY_SUFFIX: &str = "曲";
const NOT_FOUND_MESSAGE: &str = "申し訳ありませんが、適切な曲を見つけることができませんでした。";

pub fn build_query(category: Category) -> String {
    format!("{} {}", category.label(), QUERY_SUFFIX)
}

pub fn format_recommendation(candidate: &Candidate, encouragement: &str) -> String {
    format!(
        "🎵 おすすめの曲: {}\nリンク: {}\n\n✨ 応援メッセージ: {}",
        candidate.title, candidate.url, encouragement
    )
}

pub fn format_not_found(encouragement: &str) -> String {
    format!("{}\n\n✨ 応援メッセージ: {}", NOT_FOUND_MESSAGE, encouragement)
}

pub struct RecommendationEngine {
    search: Arc<dyn VideoSearch>,
    phrases: PhraseBank,
    rng: Mutex<StdRng>,
    max_results: u32,
}

impl RecommendationEngine {
    /// Engine with an entropy-seeded RNG and the default phrase bank
    pub fn new(search: Arc<dyn VideoSearch>) -> Self {
        Self::with_rng(search, StdRng::from_entropy())
    }

    /// Deterministic engine for tests and replays
    pub fn with_seed(search: Arc<dyn VideoSearch>, seed: u64) -> Self {
        Self::with_rng(search, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(search: Arc<dyn VideoSearch>, rng: StdRng) -> Self {
        Self {
            search,
            phrases: PhraseBank::default(),
            rng: Mutex::new(rng),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_phrases(mut self, phrases: PhraseBank) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn phrases(&self) -> &PhraseBank {
        &self.phrases
    }

    /// Build the reply body for `text`.
    ///
    /// Only a failed search is an error. When nothing new is found the reply
    /// apologizes and still carries an encouragement. `session.recent_titles`
    /// changes only when a candidate is selected.
    pub async fn recommend(&self, text: &str, session: &mut Session) -> Result<String> {
        let category = KeywordClassifier::classify(text);
        let query = build_query(category);
        debug!(category = ?category, query = %query, "Classified message");

        let candidates = self.search.search(&query, self.max_results).await?;

        let available: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| !session.recent_titles.contains(&c.title))
            .collect();

        // The RNG lock is never held across an await.
        let (selected, encouragement) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            let selected = available.choose(&mut *rng).copied();
            let encouragement = self.phrases.pick(category, &mut *rng).to_string();
            (selected, encouragement)
        };

        match selected {
            Some(candidate) => {
                let evicted = session.recent_titles.push(candidate.title.clone());
                info!(
                    category = ?category,
                    title = %candidate.title,
                    candidates = candidates.len(),
                    evicted = evicted.len(),
                    "Recommended song"
                );
                Ok(format_recommendation(candidate, &encouragement))
            }
            None => {
                info!(
                    category = ?category,
                    candidates = candidates.len(),
                    "No unseen song available"
                );
                Ok(format_not_found(&encouragement))
            }
        }
    }
}
