//! Raffle Utilities.
//!
//! Logging setup and the value formatting shared by the raffle client and its binaries.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unreadable_literal)]
#![warn(missing_docs)]

mod address;
mod logger;
mod units;

pub use address::*;
pub use logger::*;
pub use units::*;
