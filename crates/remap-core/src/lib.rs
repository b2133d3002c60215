pub mod config;
pub mod error;
pub mod fingerprint;
pub mod inventory;
pub mod io;
pub mod matcher;
pub mod paths;
pub mod plan;
pub mod planner;
pub mod rules;
pub mod scheduler;
pub mod topics;
pub mod types;

pub use error::{RemapError, Result};
