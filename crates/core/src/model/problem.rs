use serde::Deserialize;
use url::Url;

use crate::model::ids::ProblemId;

/// Problem difficulty tier, matching the strings used in the bundled
/// catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

fn default_platform() -> String {
    "Other".to_string()
}

/// Raw shape of one record in a bundled pattern file, before id assignment.
///
/// The data is version-controlled and trusted; deserialization is the only
/// validation it gets. A missing `url` is a valid state (the UI renders a
/// "link coming soon" placeholder), not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct RawProblem {
    pub pattern: String,
    pub title: String,
    pub difficulty: Difficulty,
    #[serde(default = "default_platform")]
    pub platform: String,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub sequence: Option<u32>,
}

/// An immutable catalog entry with its loader-assigned identifiers.
///
/// Created once at catalog-load time and never mutated afterward;
/// downstream code may hold references for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    global_index: usize,
    pattern: String,
    sequence: Option<u32>,
    title: String,
    difficulty: Difficulty,
    platform: String,
    url: Option<Url>,
}

impl Problem {
    /// Assembles a problem from a raw record plus its loader-assigned ids.
    #[must_use]
    pub fn from_raw(raw: RawProblem, id: ProblemId, global_index: usize) -> Self {
        Self {
            id,
            global_index,
            pattern: raw.pattern,
            sequence: raw.sequence,
            title: raw.title,
            difficulty: raw.difficulty,
            platform: raw.platform,
            url: raw.url,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ProblemId {
        &self.id
    }

    /// Concatenation-order position across the whole catalog.
    ///
    /// Retained only for compatibility with progress persisted before slug
    /// ids existed; never used for new writes.
    #[must_use]
    pub fn global_index(&self) -> usize {
        self.global_index
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Ordering key for the pattern group; `None` sorts last.
    #[must_use]
    pub fn sequence(&self) -> Option<u32> {
        self.sequence
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_problem_defaults_platform_and_url() {
        let raw: RawProblem = serde_json::from_str(
            r#"{ "pattern": "Stack", "title": "Min Stack", "difficulty": "Medium" }"#,
        )
        .unwrap();
        assert_eq!(raw.platform, "Other");
        assert!(raw.url.is_none());
        assert!(raw.sequence.is_none());
    }

    #[test]
    fn raw_problem_rejects_unknown_difficulty() {
        let result: Result<RawProblem, _> = serde_json::from_str(
            r#"{ "pattern": "Stack", "title": "Min Stack", "difficulty": "Brutal" }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_raw_carries_assigned_ids() {
        let raw: RawProblem = serde_json::from_str(
            r#"{
                "pattern": "Two Pointers",
                "title": "Valid Palindrome",
                "difficulty": "Easy",
                "platform": "LeetCode",
                "url": "https://leetcode.com/problems/valid-palindrome/",
                "sequence": 1
            }"#,
        )
        .unwrap();
        let problem = Problem::from_raw(raw, ProblemId::from_parts("two-pointers", 0), 7);
        assert_eq!(problem.id().as_str(), "two-pointers-0");
        assert_eq!(problem.global_index(), 7);
        assert_eq!(problem.sequence(), Some(1));
        assert_eq!(problem.difficulty(), Difficulty::Easy);
        assert_eq!(problem.url().unwrap().domain(), Some("leetcode.com"));
    }
}
