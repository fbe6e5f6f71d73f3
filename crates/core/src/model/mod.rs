mod identity;
mod ids;
mod problem;

pub use identity::{Account, Identity};
pub use ids::{AccountId, ParseIdError, ProblemId};
pub use problem::{Difficulty, Problem, RawProblem};
