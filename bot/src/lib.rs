//! Weekly report rollover bot.
//!
//! Once a week the bot closes out the current `Weekly-<N>` tracking issue,
//! opens `Weekly-<N+1>`, writes the dated report for period N to a fresh
//! branch and proposes it as a pull request.
//!
//! - **[`core`]**: Pure, deterministic logic (title parsing, period dates,
//!   document paths, error taxonomy). No I/O.
//! - **[`io`]**: Side-effecting adapters (git, `gh`, config, templates) behind
//!   traits so tests can substitute fakes.
//!
//! [`rollover`] wires the two together.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod rollover;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
