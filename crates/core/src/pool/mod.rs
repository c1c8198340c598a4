//! Bounded worker pool for batch runs.
//!
//! A run is made of:
//! - `Feeder`: lists work (directory, categories or manifest) into the work queue
//! - `Worker`s: pull requests and drive the `ItemProcessor`
//! - `FailureLogger`: appends failed item ids to a file
//! - `PoolController`: starts everything and shuts it down in order
//!
//! The work queue and failure channel are bounded and carry explicit
//! `Shutdown` sentinels: one per worker on the work queue, then one for the
//! logger after every worker has exited.

mod config;
mod controller;
mod error;
mod failure_log;
mod feeder;
mod queue;
mod types;
mod worker;

pub use config::{category_dir_name, JobConfig, PoolConfig};
pub use controller::PoolController;
pub use error::PoolError;
pub use failure_log::{create_failure_log, FailureLogger};
pub use feeder::{item_id_from_file_name, ArchiveIndex, Feeder};
pub use queue::{
    failure_channel, work_queue, FailureMessage, FailureSender, WorkMessage, WorkReceiver,
    WorkSender,
};
pub use types::{FailureLogReport, FeedReport, PoolReport, WorkerReport};
pub use worker::Worker;
