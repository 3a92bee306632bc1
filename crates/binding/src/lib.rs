//! Contract bindings for all external contracts.
//!
//! This crate consolidates the Solidity interfaces the client talks to:
//! - PiggyBank timelocked vault
//! - ERC20 tokens
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod piggy;
pub mod token;
