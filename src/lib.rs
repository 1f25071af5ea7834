pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod history;
pub mod league_params;
pub mod logging;
pub mod match_record;
pub mod pipeline;
pub mod reachability;
pub mod significance;
pub mod standings;
pub mod store;

pub use error::{SigResult, SignificanceError};
