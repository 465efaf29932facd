//! Integration-test harness for the HopeLend lending pool and its rewards
//! subsystem.
//!
//! The harness bootstraps a [`env::TestEnv`] from a deployed protocol and runs
//! groups of on-chain cases through [`suite::SuiteRunner`], isolating every
//! group behind a chain snapshot or a fork head.

pub mod chain;
pub mod contracts;
pub mod env;
pub mod error;
pub mod suite;
pub mod utils;

pub mod config {
    pub mod named_accounts;
    pub mod networks;
}
