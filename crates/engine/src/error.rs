use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("An entry named {0:?} is already registered")]
    DuplicateName(String),

    #[error("Failed to spawn the update thread: {0}")]
    Spawn(#[source] io::Error),
}
