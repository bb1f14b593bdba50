//! Async conversion.
//!
//! [`ConversionFuture`] runs a conversion on Tokio's blocking thread pool so
//! that decoding and PDF writing never stall the async runtime. Progress and
//! cancellation work the same way as for [`ConversionTask`](crate::ConversionTask).
//!
//! # Example
//!
//! ```no_run
//! use flipbook::{ConversionOptions, ConversionRequest, Converter, FlipbookError};
//!
//! # async fn example() -> Result<(), FlipbookError> {
//! let request = ConversionRequest::new("input.mp4", "out", ConversionOptions::new());
//! let future = Converter::new(request).run_async();
//! println!("{}% done", future.progress());
//! let report = future.await?;
//! println!("wrote {}", report.document.display());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::conversion::{ConversionReport, Converter};
use crate::error::FlipbookError;
use crate::progress::{CancellationToken, ProgressSignal};

/// A future that resolves when a background conversion ends.
///
/// If the blocking task panics or the runtime shuts down first, the future
/// resolves to [`FlipbookError::Cancelled`].
pub struct ConversionFuture {
    handle: JoinHandle<Result<ConversionReport, FlipbookError>>,
    signal: ProgressSignal,
    cancellation: CancellationToken,
}

impl ConversionFuture {
    /// Percentage of the running phase, 0 – 100.
    pub fn progress(&self) -> u8 {
        self.signal.percentage()
    }

    /// A clone of the signal, for observers on other tasks.
    pub fn signal(&self) -> ProgressSignal {
        self.signal.clone()
    }

    /// Ask the conversion to stop at the next frame or tile.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }
}

impl Future for ConversionFuture {
    type Output = Result<ConversionReport, FlipbookError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(FlipbookError::Cancelled)))
    }
}

impl Converter {
    /// Run the conversion on Tokio's blocking pool.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run_async(self) -> ConversionFuture {
        let (converter, signal, cancellation) = self.observed();
        let handle = tokio::task::spawn_blocking(move || converter.run());

        ConversionFuture {
            handle,
            signal,
            cancellation,
        }
    }
}
