//! Cooperative cancellation and progress reporting for body copies.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::COPY_BUFFER_SIZE;
use crate::error_handling::{is_cancellation, Canceled, RequestError};

/// Progress signal polled during long-running copies.
///
/// Implementations only have to answer [`ProgressIndicator::is_canceled`];
/// progress updates are optional.
pub trait ProgressIndicator: Send + Sync {
    /// Returns `true` once the caller wants the operation to stop.
    fn is_canceled(&self) -> bool;

    /// Reports the fraction (0.0 to 1.0) of the expected content copied so far.
    fn set_fraction(&self, _fraction: f64) {}

    /// Called with `true` when the total length is unknown.
    fn set_indeterminate(&self, _indeterminate: bool) {}

    /// Fails with [`Canceled`] if cancellation was requested.
    fn check_canceled(&self) -> Result<(), Canceled> {
        if self.is_canceled() {
            Err(Canceled)
        } else {
            Ok(())
        }
    }
}

/// Shareable progress signal backed by atomics.
///
/// Clones observe the same state, so one clone can be handed to a request
/// while another is used to cancel it or to read progress.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    canceled: Arc<AtomicBool>,
    indeterminate: Arc<AtomicBool>,
    fraction_bits: Arc<AtomicU64>,
}

impl CancellationFlag {
    /// Creates a flag that is not canceled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Last fraction reported by a copy.
    pub fn fraction(&self) -> f64 {
        f64::from_bits(self.fraction_bits.load(Ordering::SeqCst))
    }

    /// Whether the last copy could not determine its total length.
    pub fn is_indeterminate(&self) -> bool {
        self.indeterminate.load(Ordering::SeqCst)
    }
}

impl ProgressIndicator for CancellationFlag {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn set_fraction(&self, fraction: f64) {
        self.fraction_bits
            .store(fraction.to_bits(), Ordering::SeqCst);
    }

    fn set_indeterminate(&self, indeterminate: bool) {
        self.indeterminate.store(indeterminate, Ordering::SeqCst);
    }
}

/// Copies `input` into `output`, polling `indicator` between chunks.
///
/// `expected_length` is the number of bytes the body should contain when it
/// is known; a shorter body fails with `UnexpectedEof`.
///
/// # Errors
///
/// Returns `RequestError::Canceled` if the indicator requests cancellation
/// before, during or after the copy, and `RequestError::Io` for read or write
/// failures.
pub(crate) fn copy_stream_content<R, W>(
    indicator: Option<&dyn ProgressIndicator>,
    input: &mut R,
    output: &mut W,
    expected_length: Option<u64>,
) -> Result<u64, RequestError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if let Some(indicator) = indicator {
        indicator.check_canceled()?;
        if expected_length.is_none() {
            indicator.set_indeterminate(true);
        }
    }

    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut total: u64 = 0;
    loop {
        let count = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(count) => count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted && !is_cancellation(&e) => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_all(&buffer[..count])?;
        total += count as u64;

        if let Some(indicator) = indicator {
            indicator.check_canceled()?;
            if let Some(expected) = expected_length {
                indicator.set_fraction(total as f64 / expected as f64);
            }
        }
    }

    if let Some(indicator) = indicator {
        indicator.check_canceled()?;
    }

    if let Some(expected) = expected_length {
        if total < expected {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Connection closed at byte {total}. Expected {expected} bytes."),
            )
            .into());
        }
    }

    Ok(total)
}

/// Reader wrapper that checks cancellation before every read and reports
/// the fraction of `total` consumed so far. Without an indicator it passes
/// reads straight through.
pub(crate) struct ProgressReader<R> {
    indicator: Option<Arc<dyn ProgressIndicator>>,
    inner: R,
    total: u64,
    consumed: u64,
}

impl<R> ProgressReader<R> {
    pub(crate) fn new(indicator: Option<Arc<dyn ProgressIndicator>>, inner: R, total: u64) -> Self {
        Self {
            indicator,
            inner,
            total,
            consumed: 0,
        }
    }

    /// Wrapped reader.
    pub(crate) fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(indicator) = &self.indicator else {
            return self.inner.read(buf);
        };
        indicator.check_canceled()?;
        let count = self.inner.read(buf)?;
        self.consumed += count as u64;
        if self.total > 0 {
            indicator.set_fraction(self.consumed as f64 / self.total as f64);
        }
        Ok(count)
    }
}
