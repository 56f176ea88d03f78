//! WSFE issuance: wire records, structural validation, numbering and the
//! asynchronous pipeline that obtains a CAE from the authority.
//!
//! The remote service is reached through the [`VoucherService`] trait.

mod config;
mod error;
mod invoicer;
mod numbering;
mod payload;
mod response;
mod service;
mod validate;

pub use self::config::*;
pub use error::*;
pub use invoicer::*;
pub use numbering::*;
pub use payload::*;
pub use response::*;
pub use service::*;
pub use validate::*;
