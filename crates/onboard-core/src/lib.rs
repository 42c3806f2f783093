pub mod answers;
pub mod config;
pub mod consistency;
pub mod error;
pub mod feedback;
pub mod flow;
pub mod io;
pub mod metrics;
pub mod paths;
pub mod report;
pub mod signup;
pub mod steps;
pub mod store;
pub mod types;

pub use error::{OnboardError, Result};
