#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth;
pub mod error;
pub mod progress;
pub mod rest;
pub mod view;

pub use tracker_core::Clock;

pub use app_services::AppServices;
pub use auth::{AuthProvider, StaticAuthProvider};
pub use error::{AppServicesError, AuthError};
pub use progress::ProgressService;
pub use rest::{RestAuthProvider, RestConfig, RestProgressStore};
pub use view::{CatalogFilter, ExpandedPatterns, PatternGroupView, ProgressSummary, Rank};
