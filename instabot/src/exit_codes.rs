//! Stable exit codes for the instabot CLI.

/// Run completed, even if some actions were denied or skipped.
pub const OK: i32 = 0;
/// Invalid configuration or arguments, or any other failure.
pub const INVALID: i32 = 1;
/// A remote operation failed on every retry and the run was aborted.
pub const ABORTED: i32 = 2;
