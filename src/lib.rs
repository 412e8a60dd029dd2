#![cfg_attr(not(test), no_std)]
//! Polling AT command engine for u-blox SARA-R4 modems.
//!
//! A [`Modem`] sits between the module's serial port and a local terminal.
//! It issues one AT transaction at a time, classifies the reply line by line
//! and relays everything nobody asked for to the terminal. Terminal input is
//! forwarded to the module while no transaction is in flight.
//!
//! [`asynch`] adds a deadline guarded runner and board bring-up on top of
//! `embassy-time`.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod asynch;
pub mod command;
pub mod config;
pub mod csv;
pub mod error;
pub mod hex;
pub mod modem;
pub mod timer;

#[cfg(test)]
mod test_helpers;

pub use atat;

pub use config::Config;
pub use error::{Error, SetupError, TransactionError};
pub use modem::{CommandKind, CommandStatus, Diagnostics, ListenerState, Modem, Transaction};
