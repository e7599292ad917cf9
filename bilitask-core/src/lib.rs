pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod logging;
pub mod pairing;
pub mod report;
pub mod runner;
pub mod tasks;
pub mod types;

pub use client::BilibiliClient;
pub use config::Config;
pub use credential::Credential;
pub use error::{Error, Result};
pub use runner::{RunOutcome, TaskRunner};
pub use tasks::TaskResult;
pub use types::ProfileSnapshot;
