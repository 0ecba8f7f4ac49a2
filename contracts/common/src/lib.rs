//! Shared interfaces for the stake-manager contract suite.
//!
//! This crate provides:
//! - [`stakeable`] — the call contract of the external staking primitive and
//!   its secondary reward minter, plus the [`StakeSnapshot`] they return.
//! - [`receiver`] — the hook a contract implements to accept custody
//!   records through `safe_transfer_stake`.
//! - Storage TTL constants used by every contract in the workspace.

#![no_std]

pub mod receiver;
pub mod stakeable;

pub use receiver::*;
pub use stakeable::*;

// ── TTL constants ────────────────────────────────────────────────────────────

/// Remaining-ledger threshold below which persistent entries are bumped.
pub const TTL_THRESHOLD: u32 = 5_184_000;

/// Ledger count persistent entries are extended to once bumped.
pub const TTL_EXTEND_TO: u32 = 10_368_000;
