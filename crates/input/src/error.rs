use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input controller is already running")]
    AlreadyRunning,

    #[error("Failed to spawn the input thread: {0}")]
    Spawn(#[source] io::Error),
}
