//! CLI exit codes (spec §6). Every subcommand maps its outcome onto one of
//! these three rather than returning an arbitrary process status.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Everything requested succeeded.
    Success = 0,
    /// At least one source (or check) came back partial/degraded.
    Partial = 1,
    /// Fatal: nothing ran, or the command's own invariants were violated.
    Fatal = 2,
}

impl From<scrapcore_types::RunStatus> for ExitCode {
    fn from(status: scrapcore_types::RunStatus) -> Self {
        match status {
            scrapcore_types::RunStatus::Success => ExitCode::Success,
            scrapcore_types::RunStatus::Partial => ExitCode::Partial,
            scrapcore_types::RunStatus::Failed => ExitCode::Fatal,
        }
    }
}
