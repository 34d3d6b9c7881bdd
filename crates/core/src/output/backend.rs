use log::{info, warn};
use thiserror::Error;

use crate::pixel::frame::PixelFrame;
use crate::transport::TransportError;

/// Errors produced while building or driving an output backend.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The transport for this backend could not be acquired.
    #[error("{backend} driver unavailable: {source}")]
    DriverUnavailable {
        backend: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("show() is not implemented for this backend")]
    Unimplemented,

    #[error("frame has {actual} pixels but the backend drives {expected}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    /// A send, write or flush failed during `show()`.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A device that can display a [`PixelFrame`].
///
/// `show` clips, corrects, packs and transmits in one blocking call. There is
/// no buffering between calls, so pacing is up to the caller.
pub trait OutputBackend {
    /// Short backend name for log lines.
    fn name(&self) -> &'static str;

    /// Number of pixels this backend was built for.
    fn pixel_count(&self) -> usize;

    fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
        let _ = frame;
        Err(OutputError::Unimplemented)
    }
}

/// Run a transport acquisition, turning failure into `DriverUnavailable`.
pub fn acquire<T>(
    backend: &'static str,
    open: impl FnOnce() -> Result<T, TransportError>,
) -> Result<T, OutputError> {
    match open() {
        Ok(transport) => {
            info!("{} transport acquired", backend);
            Ok(transport)
        }
        Err(source) => {
            warn!("{} transport unavailable: {}", backend, source);
            Err(OutputError::DriverUnavailable { backend, source })
        }
    }
}

pub(crate) fn check_len(expected: usize, actual: usize) -> Result<(), OutputError> {
    if expected == actual {
        Ok(())
    } else {
        Err(OutputError::FrameSizeMismatch { expected, actual })
    }
}
