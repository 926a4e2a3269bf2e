pub mod archive;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod hasher;
pub mod model;
pub mod progress;
pub mod scanner;

pub use config::AppConfig;
pub use engine::{RunContext, RunResult, SieveEngine};
pub use error::Error;
pub use model::{AcceptedBook, Category, Outcome, Reason, RejectionRecord, Statistics};
pub use progress::{ProgressReporter, SilentReporter};
