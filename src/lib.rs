pub mod audio;
pub mod config;
pub mod error;
pub mod local;
pub mod logging;
pub mod processing;
pub mod visualization;


pub use config::Config;
pub use error::PipelineError;
pub use processing::alert::{AlertPolicy, AlertTier};
pub use processing::parser::Sample;
pub use processing::pipeline::{IngestionPipeline, StepOutcome};
pub use processing::window::SlidingWindow;
