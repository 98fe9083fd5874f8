#![deny(missing_docs)]
#![cfg_attr(not(test), forbid(unsafe_code))]

//! Basics program: create an account and store a single value in it

pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;

// Exclude the on-chain entrypoint when building unit tests or when the
// consumer opts into the "no-entrypoint" feature (host-side contexts).
#[cfg(all(not(feature = "no-entrypoint"), not(test)))]
mod entrypoint;

solana_program::declare_id!("AvqQqrpaAKJvubgF7ZP2mD4PkB53LTfo1qFuKRujTzN2");

