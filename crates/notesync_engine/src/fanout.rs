//! Issuing one write against several backends.

use crate::error::{SyncError, SyncResult};
use crate::registry::BackendHandle;
use notesync_storage::StorageResult;
use tracing::{error, warn};

/// How a write is spread across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOutPolicy {
    /// The primary must succeed; other backends are attempted and their
    /// failures logged.
    BestEffortSecondary,
    /// Every backend must succeed; the first failure stops the loop.
    AllOrAbort,
}

impl FanOutPolicy {
    /// Runs `op` against `handles` in ordinal order.
    ///
    /// With `isolate` set, [`FanOutPolicy::AllOrAbort`] still attempts every
    /// backend before reporting the first failure.
    ///
    /// # Errors
    ///
    /// - `BestEffortSecondary`: the primary's failure; nothing else runs.
    /// - `AllOrAbort`: the first failure in ordinal order.
    pub fn apply<F>(self, handles: &[BackendHandle], isolate: bool, mut op: F) -> SyncResult<()>
    where
        F: FnMut(&BackendHandle) -> StorageResult<()>,
    {
        match self {
            FanOutPolicy::BestEffortSecondary => {
                let Some((primary, rest)) = handles.split_first() else {
                    return Ok(());
                };
                op(primary)?;
                for handle in rest {
                    if let Err(e) = op(handle) {
                        warn!(
                            ordinal = handle.ordinal(),
                            backend = handle.kind(),
                            error = %e,
                            "secondary write failed"
                        );
                    }
                }
                Ok(())
            }
            FanOutPolicy::AllOrAbort => {
                let mut first: Option<SyncError> = None;
                for handle in handles {
                    if let Err(e) = op(handle) {
                        error!(
                            ordinal = handle.ordinal(),
                            backend = handle.kind(),
                            error = %e,
                            "write failed"
                        );
                        if !isolate {
                            return Err(e.into());
                        }
                        first.get_or_insert(e.into());
                    }
                }
                first.map_or(Ok(()), Err)
            }
        }
    }
}
