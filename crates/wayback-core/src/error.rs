// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WaybackError>;

#[derive(Debug, Error)]
pub enum WaybackError {
    #[error("{} not found or not executable", path.display())]
    NotExecutable { path: PathBuf },

    #[error("unable to create socket pair: {0}")]
    Resource(#[source] std::io::Error),

    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to connect to compositor: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("unable to get outputs")]
    NoDisplaysFound,

    #[error("output {handle} has no known size")]
    NoGeometry { handle: u32 },
}
