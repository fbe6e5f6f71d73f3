//! Presentation-agnostic view data derived from the catalog and the
//! completed set: aggregate stats, filtering, pattern grouping, and
//! expand/collapse state.
//!
//! These are intentionally **not** UI view-models — no pre-formatted
//! strings, no layout assumptions. The component tree renders on top.

use std::collections::HashSet;

use tracker_core::Catalog;
use tracker_core::model::{Difficulty, Problem, ProblemId};

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Aggregate completion figures for a set of problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    /// Rounded whole percentage; 0 when `total` is 0.
    pub percentage: u8,
}

impl ProgressSummary {
    #[must_use]
    pub fn compute(total: usize, completed: usize) -> Self {
        let completed = completed.min(total);
        let percentage = if total == 0 {
            0
        } else {
            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
            let pct = ((completed as f64 / total as f64) * 100.0).round() as u8;
            pct
        };
        Self {
            total,
            completed,
            remaining: total - completed,
            percentage,
        }
    }

    #[must_use]
    pub fn rank(&self) -> Rank {
        Rank::from_percentage(self.percentage)
    }
}

/// Display rank derived from overall completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Novice,
    Apprentice,
    Specialist,
    Expert,
    Grandmaster,
}

impl Rank {
    #[must_use]
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            100.. => Rank::Grandmaster,
            76..=99 => Rank::Expert,
            51..=75 => Rank::Specialist,
            26..=50 => Rank::Apprentice,
            _ => Rank::Novice,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Novice => "Novice",
            Rank::Apprentice => "Apprentice",
            Rank::Specialist => "Specialist",
            Rank::Expert => "Expert",
            Rank::Grandmaster => "Grandmaster",
        }
    }
}

//
// ─── FILTERING & GROUPING ──────────────────────────────────────────────────────
//

/// Active search and filter criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Case-insensitive substring match over title or pattern name.
    pub search: String,
    /// `None` means "All".
    pub difficulty: Option<Difficulty>,
    /// `None` means "All"; otherwise exact platform name.
    pub platform: Option<String>,
}

impl CatalogFilter {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.difficulty.is_some() || self.platform.is_some()
    }

    #[must_use]
    pub fn matches(&self, problem: &Problem) -> bool {
        let matches_search = if self.search.is_empty() {
            true
        } else {
            let needle = self.search.to_lowercase();
            problem.title().to_lowercase().contains(&needle)
                || problem.pattern().to_lowercase().contains(&needle)
        };
        let matches_difficulty = self
            .difficulty
            .is_none_or(|d| problem.difficulty() == d);
        let matches_platform = self
            .platform
            .as_deref()
            .is_none_or(|p| problem.platform() == p);
        matches_search && matches_difficulty && matches_platform
    }
}

/// One pattern group after filtering, with its per-group completion.
#[derive(Debug, Clone)]
pub struct PatternGroupView<'a> {
    pub pattern: &'a str,
    pub sequence: Option<u32>,
    pub problems: Vec<&'a Problem>,
    pub summary: ProgressSummary,
}

impl PatternGroupView<'_> {
    #[must_use]
    pub fn is_fully_completed(&self) -> bool {
        self.summary.total > 0 && self.summary.completed == self.summary.total
    }
}

/// Groups the filtered catalog by pattern, ordered by pattern sequence
/// with sequence-less patterns last (stable among themselves).
///
/// With no active filter every pattern appears, even when empty; with an
/// active filter, patterns whose problems all filtered out are dropped.
#[must_use]
pub fn group_problems<'a>(
    catalog: &'a Catalog,
    filter: &CatalogFilter,
    completed: &HashSet<ProblemId>,
) -> Vec<PatternGroupView<'a>> {
    let mut groups: Vec<PatternGroupView<'a>> = catalog
        .patterns()
        .into_iter()
        .map(|pattern| PatternGroupView {
            pattern,
            sequence: catalog.pattern_sequence(pattern),
            problems: Vec::new(),
            summary: ProgressSummary::compute(0, 0),
        })
        .collect();

    for problem in catalog.problems() {
        if !filter.matches(problem) {
            continue;
        }
        if let Some(group) = groups.iter_mut().find(|g| g.pattern == problem.pattern()) {
            group.problems.push(problem);
        }
    }

    if filter.is_active() {
        groups.retain(|g| !g.problems.is_empty());
    }

    for group in &mut groups {
        let done = group
            .problems
            .iter()
            .filter(|p| completed.contains(p.id()))
            .count();
        group.summary = ProgressSummary::compute(group.problems.len(), done);
    }

    groups.sort_by(|a, b| match (a.sequence, b.sequence) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    groups
}

//
// ─── EXPAND / COLLAPSE ─────────────────────────────────────────────────────────
//

/// Which pattern groups are currently expanded.
///
/// Starts all-expanded; bulk operations are scoped to the groups visible
/// under the current filter so a filtered "collapse all" does not disturb
/// hidden groups.
#[derive(Debug, Clone, Default)]
pub struct ExpandedPatterns {
    expanded: HashSet<String>,
}

impl ExpandedPatterns {
    /// All of the catalog's patterns start expanded.
    #[must_use]
    pub fn all(catalog: &Catalog) -> Self {
        Self {
            expanded: catalog.patterns().iter().map(|p| (*p).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn is_expanded(&self, pattern: &str) -> bool {
        self.expanded.contains(pattern)
    }

    pub fn toggle(&mut self, pattern: &str) {
        if !self.expanded.remove(pattern) {
            self.expanded.insert(pattern.to_string());
        }
    }

    pub fn expand_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>) {
        for pattern in visible {
            self.expanded.insert(pattern.to_string());
        }
    }

    pub fn collapse_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>) {
        for pattern in visible {
            self.expanded.remove(pattern);
        }
    }

    /// True when every visible group is expanded (and there is at least
    /// one).
    #[must_use]
    pub fn all_expanded<'a>(&self, visible: impl IntoIterator<Item = &'a str>) -> bool {
        let mut any = false;
        for pattern in visible {
            any = true;
            if !self.expanded.contains(pattern) {
                return false;
            }
        }
        any
    }

    /// Auto-expands every pattern with a problem matching the active
    /// search, leaving other groups as they were.
    pub fn expand_matches(&mut self, catalog: &Catalog, search: &str) {
        if search.is_empty() {
            return;
        }
        let needle = search.to_lowercase();
        for problem in catalog.problems() {
            if problem.title().to_lowercase().contains(&needle)
                || problem.pattern().to_lowercase().contains(&needle)
            {
                self.expanded.insert(problem.pattern().to_string());
            }
        }
    }
}
