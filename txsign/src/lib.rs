#![deny(missing_docs)]

//! Sign a spend of one unspent output and report whether it verifies.
//!
//! Re-exports the layer crates and provides the [`workflow`] that the
//! `txsign` binary drives: parse a raw transaction, replace its inputs with
//! a single unspent output, sign with a WIF key, then print the result.

pub use txsign_primitives as primitives;
pub use txsign_script as script;
pub use txsign_transaction as transaction;

pub mod config;
pub mod workflow;

pub use workflow::{run, OutputFormat, SignOutcome, SignRequest, WorkflowError};
