//! Categorized change summaries.

use serde::{Deserialize, Deserializer, Serialize};

/// The four fixed categories a classification backend fills in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedChanges {
    /// Price points, plans, discounts
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pricing: Vec<String>,

    /// Feature additions/removals and product launches
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,

    /// Messaging and positioning shifts
    #[serde(default, deserialize_with = "null_as_empty")]
    pub positioning: Vec<String>,

    /// 1-2 lines on strategic implications
    #[serde(default, deserialize_with = "null_as_empty")]
    pub strategy: Vec<String>,
}

/// Category keys, in fixed order.
pub const CATEGORY_KEYS: [&str; 4] = ["pricing", "features", "positioning", "strategy"];

/// A `null` category is an empty one.
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Option::<Vec<String>>::deserialize(d).map(Option::unwrap_or_default)
}

impl CategorizedChanges {
    /// True when every category is empty.
    pub fn is_empty(&self) -> bool {
        self.pricing.is_empty()
            && self.features.is_empty()
            && self.positioning.is_empty()
            && self.strategy.is_empty()
    }

    /// Categories paired with their key, in fixed order.
    pub fn categories(&self) -> [(&'static str, &[String]); 4] {
        [
            ("pricing", &self.pricing),
            ("features", &self.features),
            ("positioning", &self.positioning),
            ("strategy", &self.strategy),
        ]
    }
}

/// Summary of a change set.
///
/// Serializes as a flat JSON object: either the four category keys,
/// a single `message` key, or a single `error` key. Backend replies go
/// through `parse_summary`, which prefers categories when both appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangeSummary {
    /// Classification unavailable or failed
    Error { error: String },

    /// Nothing worth classifying
    Message { message: String },

    /// Backend classification result
    Categorized(CategorizedChanges),
}

impl ChangeSummary {
    /// Message used when the change set is empty.
    pub const NO_CHANGES: &'static str = "No significant strategic changes detected.";

    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error {
            error: reason.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    pub fn no_changes() -> Self {
        Self::message(Self::NO_CHANGES)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The categorized payload, if classification succeeded.
    pub fn categorized(&self) -> Option<&CategorizedChanges> {
        match self {
            Self::Categorized(changes) => Some(changes),
            _ => None,
        }
    }
}
