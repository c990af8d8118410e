//! Utility functions that don't belong anywhere else.

use crate::error::{AscentError, Result};

/// Allocate a buffer of exactly `len` elements, all set to `fill`.
///
/// Unlike `vec![fill; len]`, running out of memory is reported as an error instead of aborting.
pub(crate) fn allocate_buffer<T: Copy>(len: usize, fill: T) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| AscentError::AllocationFailure)?;
    buffer.resize(len, fill);

    Ok(buffer)
}
