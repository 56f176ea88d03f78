//! Core invoice rule tables, validators and tax calculation.
//!
//! Everything here is pure: no I/O, no clock reads except where a
//! function says it defaults to today.

mod builder;
mod calc;
mod codes;
pub mod currencies;
mod error;
mod identity;
mod types;
mod validation;

pub use builder::*;
pub use calc::*;
pub use codes::*;
pub use currencies::{DEFAULT_CURRENCY, is_known_currency_id};
pub use error::*;
pub use identity::*;
pub use types::*;
pub use validation::*;
