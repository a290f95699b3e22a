// ABOUTME: Log sink trait for execution environments.
// ABOUTME: Swap where attached container output is written.

use super::sealed::Sealed;
use super::shared_types::LogWriter;

pub trait LogOps: Sealed + Send + Sync {
    /// Install new stdout/stderr sinks and return the previous ones.
    fn replace_log_writer(&self, stdout: LogWriter, stderr: LogWriter) -> (LogWriter, LogWriter);
}
