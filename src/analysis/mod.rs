//! Mock body-composition analysis.
//!
//! - **Engine**: pure formulas mapping user data to derived metrics
//! - **Backend**: asynchronous boundary the flow controller awaits
//! - **Workout**: preview plan chosen from the results
//!
//! # Example
//!
//! ```ignore
//! use body_assessment::analysis::{analyze, workout_plan_for};
//!
//! let results = analyze(&user_data)?;
//! println!("BMI {:.1} ({})", results.bmi, results.bmi_category.label());
//! let plan = workout_plan_for(&results);
//! ```

pub mod backend;
pub mod engine;
mod summary;
pub mod types;
mod workout;

pub use backend::{AnalysisBackend, SimulatedBackend};
pub use engine::analyze;
pub use summary::share_summary;
pub use types::*;
pub use workout::{workout_plan_for, PlanKind, WorkoutPlan, WorkoutSession};
