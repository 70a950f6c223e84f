//! Stable exit codes for `working-bot` commands.

/// Command succeeded (including a rollover with nothing to publish).
pub const OK: i32 = 0;
/// Invalid input or configuration; nothing was changed remotely.
pub const INVALID: i32 = 1;
/// A rollover stage failed after remote calls began; the tracker or the
/// remote branch may need manual attention.
pub const STAGE_FAILED: i32 = 2;
