//! Raffle Types.
//!
//! Bindings for the raffle contract's ABI and the types shared by every crate that talks to it.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![warn(missing_docs)]

mod config;
pub mod sol;
mod state;

pub use config::*;
pub use state::*;
