//! Machine construction errors.

use std::io;
use std::path::PathBuf;

use emu_core::Fault;
use thiserror::Error;

/// Errors raised while building or running a [`crate::Snes`].
#[derive(Debug, Error)]
pub enum SnesError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("ROM image is empty")]
    EmptyRom,

    #[error(transparent)]
    Fault(#[from] Fault),
}
