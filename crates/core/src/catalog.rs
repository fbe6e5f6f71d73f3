//! Catalog loader: merges the bundled per-pattern problem lists into one
//! immutable ordered sequence with stable, loader-assigned ids.

use thiserror::Error;

use crate::model::{Problem, ProblemId, RawProblem};

/// Bundled per-pattern data files, in catalog order.
///
/// Order matters: `global_index` is assigned by concatenation order, and
/// older persisted progress may still reference those positions.
const BUNDLED_PATTERNS: &[(&str, &str)] = &[
    ("two-pointers.json", include_str!("../data/patterns/two-pointers.json")),
    ("fast-slow-pointers.json", include_str!("../data/patterns/fast-slow-pointers.json")),
    ("sliding-window.json", include_str!("../data/patterns/sliding-window.json")),
    ("merge-intervals.json", include_str!("../data/patterns/merge-intervals.json")),
    ("binary-search.json", include_str!("../data/patterns/binary-search.json")),
    ("stack.json", include_str!("../data/patterns/stack.json")),
    ("bitwise-xor.json", include_str!("../data/patterns/bitwise-xor.json")),
];

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// A bundled pattern file failed to deserialize. The data is
    /// version-controlled, so this is a packaging defect, not a runtime
    /// condition.
    #[error("malformed bundled pattern file {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Lowercases a pattern name and collapses every run of non-alphanumeric
/// characters into a single `-`, stripping leading/trailing dashes.
///
/// `"Fast & Slow Pointers"` becomes `fast-slow-pointers`. Ids derived from
/// the slug must stay stable, so changing this function is a data
/// migration.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// The merged, immutable problem catalog.
///
/// Built once per process; no in-place mutation afterward, since
/// downstream code may hold references for the whole session.
#[derive(Debug, Clone)]
pub struct Catalog {
    problems: Vec<Problem>,
}

impl Catalog {
    /// Merges per-pattern ordered lists into one catalog, pattern-list by
    /// pattern-list in input order.
    ///
    /// Each problem's id is the slug of its own `pattern` field plus its
    /// zero-based index within its source list; `global_index` increments
    /// across the whole merge. Id uniqueness follows from that composition
    /// as long as no two lists share both a slug and a colliding index.
    #[must_use]
    pub fn from_pattern_lists(lists: Vec<Vec<RawProblem>>) -> Self {
        let mut problems = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        let mut global_index = 0;
        for list in lists {
            for (index, raw) in list.into_iter().enumerate() {
                let id = ProblemId::from_parts(&slugify(&raw.pattern), index);
                problems.push(Problem::from_raw(raw, id, global_index));
                global_index += 1;
            }
        }
        Self { problems }
    }

    /// Loads the catalog from the bundled pattern files.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Malformed` if a bundled file fails to parse.
    pub fn bundled() -> Result<Self, CatalogError> {
        let mut lists = Vec::with_capacity(BUNDLED_PATTERNS.len());
        for (file, contents) in BUNDLED_PATTERNS {
            let list: Vec<RawProblem> =
                serde_json::from_str(contents).map_err(|source| CatalogError::Malformed {
                    file: (*file).to_string(),
                    source,
                })?;
            lists.push(list);
        }
        Ok(Self::from_pattern_lists(lists))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    /// Looks up a problem by id.
    #[must_use]
    pub fn get(&self, id: &ProblemId) -> Option<&Problem> {
        self.problems.iter().find(|p| p.id() == id)
    }

    /// Distinct pattern names in first-seen catalog order.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for problem in &self.problems {
            if !seen.contains(&problem.pattern()) {
                seen.push(problem.pattern());
            }
        }
        seen
    }

    /// Ordering key for a pattern group, taken from the first problem
    /// carrying that pattern. `None` when the pattern has no discoverable
    /// sequence (such patterns sort last).
    #[must_use]
    pub fn pattern_sequence(&self, pattern: &str) -> Option<u32> {
        self.problems
            .iter()
            .find(|p| p.pattern() == pattern)
            .and_then(Problem::sequence)
    }
}
