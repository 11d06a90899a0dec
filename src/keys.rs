use serde::{Deserialize, Serialize};

/// The three review shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewKey {
    /// `1` or `j`
    Remove,
    /// `k`
    Back,
    /// `l`
    Keep,
}

impl ReviewKey {
    /// Maps a key name from the UI. Held-key repeats are ignored so one
    /// press is always one decision.
    pub fn from_key(key: &str, repeat: bool) -> Option<Self> {
        if repeat {
            return None;
        }
        match key.to_lowercase().as_str() {
            "1" | "j" => Some(ReviewKey::Remove),
            "k" => Some(ReviewKey::Back),
            "l" => Some(ReviewKey::Keep),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(ReviewKey::from_key("1", false), Some(ReviewKey::Remove));
        assert_eq!(ReviewKey::from_key("J", false), Some(ReviewKey::Remove));
        assert_eq!(ReviewKey::from_key("k", false), Some(ReviewKey::Back));
        assert_eq!(ReviewKey::from_key("L", false), Some(ReviewKey::Keep));
        assert_eq!(ReviewKey::from_key("x", false), None);
        assert_eq!(ReviewKey::from_key("Enter", false), None);
    }

    #[test]
    fn test_repeats_are_ignored() {
        assert_eq!(ReviewKey::from_key("j", true), None);
        assert_eq!(ReviewKey::from_key("l", true), None);
    }
}
