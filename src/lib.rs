//! # afip-factura
//!
//! Argentine electronic invoicing: turns a friendly invoice request into
//! the WSFE voucher record, validates it twice, assigns the next voucher
//! number and obtains the CAE from the tax authority.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! VAT is rounded per line to two decimals, half away from zero.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use afip_factura::core::*;
//! use rust_decimal_macros::dec;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! let request = InvoiceRequestBuilder::new(
//!     VoucherType::InvoiceB,
//!     Concept::Products,
//!     Customer::final_consumer(),
//! )
//! .add_item(LineItem::new("Producto 1", dec!(2), dec!(100), VatAliquot::TwentyOne))
//! .add_item(LineItem::new("Producto 2", dec!(1), dec!(50), VatAliquot::TwentyOne))
//! .build_at(today)
//! .unwrap();
//!
//! let totals = compute_totals(&request.items, request.customer.vat_condition);
//! assert_eq!(totals.net, dec!(250));
//! assert_eq!(totals.vat, dec!(52.50));
//! assert_eq!(totals.total, dec!(302.50));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Rule tables, identifier checks, request validation, VAT calculation |
//! | `wsfe` (default) | Wire payload, structural validation, numbering, async issuance pipeline |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "wsfe")]
pub mod wsfe;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
