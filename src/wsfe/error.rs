use thiserror::Error;

use super::invoicer::InvoiceStage;
use super::service::AuthorityError;
use crate::core::ValidationResult;

/// Failure of an invoicing operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoicingError {
    /// The friendly request was rejected before any remote call.
    #[error("invalid invoice request: {0}")]
    InputValidation(ValidationResult),

    /// The wire record failed structural checks; nothing was submitted.
    #[error("invalid authority payload: {0}")]
    StructuralValidation(ValidationResult),

    /// The authority failed or refused the operation.
    #[error("{stage} failed: {source}")]
    Authority {
        stage: InvoiceStage,
        #[source]
        source: AuthorityError,
    },

    /// A query outside of issuance (lookup, catalogs, status) failed.
    #[error(transparent)]
    Service(#[from] AuthorityError),

    #[error("voucher {number} (sales point {sales_point}, type {voucher_type}) not found")]
    NotFound {
        number: u64,
        sales_point: u32,
        voucher_type: u16,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl InvoicingError {
    /// Pipeline stage the failure occurred in, if it came from an issuance.
    pub fn stage(&self) -> Option<InvoiceStage> {
        match self {
            Self::InputValidation(_) => Some(InvoiceStage::ValidatingInput),
            Self::StructuralValidation(_) => Some(InvoiceStage::ValidatingStructure),
            Self::Authority { stage, .. } => Some(*stage),
            Self::Service(_) | Self::NotFound { .. } | Self::Config(_) => None,
        }
    }

    /// Validation errors carried by either validation variant.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::InputValidation(result) | Self::StructuralValidation(result) => Some(result),
            _ => None,
        }
    }
}
