//! Tag-driven follow/like/comment automation with quotas and retries.
//!
//! The crate decides, for every candidate discovered under a tag, whether an
//! action is permitted, performs it through a retrying executor, and reports
//! what happened. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (eligibility, quotas, dedup,
//!   report rendering, backoff schedule). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (config file, remote client, mail).
//!   Isolated behind traits to enable scripted doubles in tests.
//!
//! Orchestration modules ([`retry`], [`engine`]) combine core logic with I/O
//! to implement the CLI commands.

pub mod core;
pub mod engine;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod retry;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
