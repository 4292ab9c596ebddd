//! Reset/step orchestration for the commons harvest environment.
//!
//! [`HarvestEnv`] composes the step stages from `commons-propagators`
//! and the observation builder from `commons-obs` into the pure
//! transition `(key, state, actions) -> (obs, next_state, rewards, done,
//! info)`. [`BatchedEnv`] runs many independent worlds side by side.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batched;
pub mod config;
pub mod env;
pub mod metrics;
pub mod step;

pub use batched::{BatchError, BatchStepResult, BatchedEnv};
pub use config::{ConfigError, EnvConfig, RewardMode};
pub use env::HarvestEnv;
pub use metrics::StepMetrics;
pub use step::{Done, StepError, StepInfo, StepResult};
