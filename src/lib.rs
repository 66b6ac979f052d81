// Library interface for the plan generation pipeline
// Integration tests and downstream tools go through these modules

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pace;
pub mod phases;
pub mod plan;
pub mod races;
pub mod scheduler;
pub mod simulate;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::PlanConfig;
pub use error::{PlanError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use pace::PaceModel;
pub use phases::PhasePlanner;
pub use plan::{export_json, generate_plan};
pub use races::RaceResolver;
pub use scheduler::SessionScheduler;
pub use simulate::{diff_plans, simulate, PlanOverrides, WeekDiff, WeekSummary};
