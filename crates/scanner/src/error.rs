#![forbid(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to enumerate processes under {}: {source}", root.display())]
    Enumerate {
        root: PathBuf,
        #[source]
        source: procfs::ProcError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] config::Error),

    #[error("scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
