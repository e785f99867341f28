use crate::{CoreResult, platform::WritableFile};

use tracing::warn;

/// RAII guard that guarantees a writable file is closed when dropped.
///
/// A write that fails partway still releases the handle. `close` reports the
/// close error on the happy path; on drop the close is best-effort.
pub(crate) struct WriteScope {
    file: Box<dyn WritableFile>,
    closed: bool,
}

impl WriteScope {
    pub(crate) fn new(file: Box<dyn WritableFile>) -> Self {
        Self {
            file,
            closed: false,
        }
    }

    pub(crate) fn write_all(&mut self, data: &[u8]) -> CoreResult<()> {
        self.file.write_all(data)
    }

    pub(crate) fn close(mut self) -> CoreResult<()> {
        self.closed = true;
        self.file.close()
    }
}

impl Drop for WriteScope {
    fn drop(&mut self) {
        if !self.closed
            && let Err(e) = self.file.close()
        {
            warn!(error = %e, "Failed to close write handle after aborted write");
        }
    }
}
