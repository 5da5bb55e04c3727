//! Encouragement phrases appended to every recommendation

use crate::classifier::Category;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

const FALLBACK_PHRASE: &str = "今日も素敵な一日を！🌟";

const DEFAULT_PHRASES: &[(Category, &[&str])] = &[
    (
        Category::Relax,
        &["深呼吸してね！🍃", "今日は自分を甘やかそう🎵", "心をゆるめて☺️"],
    ),
    (
        Category::Fun,
        &["笑顔が一番やで！😁", "楽しんでこそ人生や！🎉", "気分アゲアゲやね！😆"],
    ),
    (
        Category::Encourage,
        &["負けへんで！🔥", "まだまだこれからや💪", "頑張るあんた、カッコええで！✨"],
    ),
    (
        Category::RainyDay,
        &["雨の日も心晴れやかに☔️", "雨上がりを楽しみに🌈", "静かに過ごすんもええやろ🌧️"],
    ),
    (
        Category::Popular,
        &["音楽で元気チャージ🎧", "気分転換しよう🎶", "良い曲で笑顔に！😊"],
    ),
];

/// Category → phrases, with a fallback for categories that have none
#[derive(Debug, Clone)]
pub struct PhraseBank {
    phrases: HashMap<Category, Vec<String>>,
    fallback: String,
}

impl PhraseBank {
    /// An empty bank; every pick returns the fallback
    pub fn empty() -> Self {
        Self {
            phrases: HashMap::new(),
            fallback: FALLBACK_PHRASE.to_string(),
        }
    }

    pub fn with_phrases<I, S>(mut self, category: Category, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.phrases
            .insert(category, phrases.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn phrases_for(&self, category: Category) -> &[String] {
        self.phrases
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Uniform pick among the category's phrases
    pub fn pick<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> &str {
        self.phrases_for(category)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }
}

impl Default for PhraseBank {
    fn default() -> Self {
        DEFAULT_PHRASES
            .iter()
            .fold(Self::empty(), |bank, (category, phrases)| {
                bank.with_phrases(*category, phrases.iter().copied())
            })
    }
}
