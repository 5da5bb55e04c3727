//! Keyword Classifier
//!
//! Maps a chat message to the mood/topic category that drives both the
//! YouTube query and the encouragement phrase:
//! - Relax: the user is tired
//! - Fun: the user is having a good time
//! - Encourage: the user is sad
//! - RainyDay: the message mentions rain
//! - Popular: anything else

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Relax,
    Fun,
    Encourage,
    RainyDay,
    Popular,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Relax,
        Category::Fun,
        Category::Encourage,
        Category::RainyDay,
        Category::Popular,
    ];

    /// Label used in search queries and phrase lookup
    pub fn label(self) -> &'static str {
        match self {
            Category::Relax => "リラックス",
            Category::Fun => "楽しい",
            Category::Encourage => "元気づける",
            Category::RainyDay => "雨の日の曲",
            Category::Popular => "人気の曲",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the ordered rule list: any trigger contained in the text selects `category`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub triggers: &'static [&'static str],
    pub category: Category,
}

impl KeywordRule {
    pub fn matches(&self, text: &str) -> bool {
        self.triggers.iter().any(|trigger| text.contains(trigger))
    }
}

/// Rules in priority order — zero allocation
const RULES: &[KeywordRule] = &[
    KeywordRule {
        triggers: &["疲れた", "つかれた"],
        category: Category::Relax,
    },
    KeywordRule {
        triggers: &["楽しい", "たのしい"],
        category: Category::Fun,
    },
    KeywordRule {
        triggers: &["悲しい", "かなしい"],
        category: Category::Encourage,
    },
    KeywordRule {
        triggers: &["雨"],
        category: Category::RainyDay,
    },
];

const DEFAULT_CATEGORY: Category = Category::Popular;

/// Keyword classifier
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Classify a message; the first matching rule wins
    pub fn classify(text: &str) -> Category {
        RULES
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.category)
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// The rule list, highest priority first
    pub fn rules() -> &'static [KeywordRule] {
        RULES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triggers() {
        let cases = vec![
            ("今日はほんまに疲れた", Category::Relax),
            ("めっちゃ楽しい一日やった", Category::Fun),
            ("ちょっと悲しいことがあって", Category::Encourage),
            ("外は雨やなあ", Category::RainyDay),
            ("つかれたわ", Category::Relax),
            ("たのしいね", Category::Fun),
            ("かなしい", Category::Encourage),
        ];

        for (text, expected) in cases {
            assert_eq!(KeywordClassifier::classify(text), expected, "text: {}", text);
        }
    }

    #[test]
    fn test_priority_order() {
        assert_eq!(KeywordClassifier::classify("疲れたけど楽しい"), Category::Relax);
        assert_eq!(KeywordClassifier::classify("楽しいけど雨"), Category::Fun);
        assert_eq!(KeywordClassifier::classify("雨で悲しい"), Category::Encourage);
    }

    #[test]
    fn test_default_category() {
        assert_eq!(KeywordClassifier::classify(""), Category::Popular);
        assert_eq!(KeywordClassifier::classify("hello"), Category::Popular);
        assert_eq!(KeywordClassifier::classify("おすすめある？"), Category::Popular);
    }

    #[test]
    fn test_deterministic() {
        for text in ["疲れた", "雨", "なんでもない"] {
            assert_eq!(KeywordClassifier::classify(text), KeywordClassifier::classify(text));
        }
    }

    #[test]
    fn test_rule_order_is_explicit() {
        let order: Vec<Category> = KeywordClassifier::rules().iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![Category::Relax, Category::Fun, Category::Encourage, Category::RainyDay]
        );
        assert!(KeywordClassifier::rules()[3].matches("大雨"));
        assert!(!KeywordClassifier::rules()[0].matches("元気"));
    }
}
