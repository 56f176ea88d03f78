//! Seam to the remote invoicing web service.
//!
//! The transport (SOAP, token/sign authentication, certificates) lives in
//! the implementor; this crate only hands over the payload and reads back
//! the typed reply.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::payload::WireInvoicePayload;
use crate::core::VoucherType;

/// Error detail attached by the authority to a reply (`Err` / `Obs` entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityMessage {
    #[serde(rename = "Code")]
    pub code: i64,
    #[serde(rename = "Msg")]
    pub message: String,
}

impl std::fmt::Display for AuthorityMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.code, self.message)
    }
}

/// Failure reported by, or while talking to, the authority.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum AuthorityError {
    /// The service answered with an error of its own.
    #[error("authority error {code}: {message}")]
    Authority { code: i64, message: String },

    /// The voucher was processed but not approved.
    #[error("voucher rejected: {}", join_messages(.messages))]
    Rejected { messages: Vec<AuthorityMessage> },

    /// Network, TLS or decoding failure; the raw message is kept.
    #[error("transport error: {0}")]
    Transport(String),
}

fn join_messages(messages: &[AuthorityMessage]) -> String {
    if messages.is_empty() {
        return "no detail given".into();
    }
    messages
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reply to a voucher submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityReply {
    /// Electronic authorization code.
    #[serde(rename = "CAE", default)]
    pub cae: Option<String>,
    /// CAE expiry, `YYYYMMDD`.
    #[serde(rename = "CAEFchVto", default)]
    pub cae_expiry: Option<String>,
    /// `A` approved, `R` rejected, `P` partially approved.
    #[serde(rename = "Resultado", default)]
    pub result: Option<String>,
    /// Number the authority recorded for the voucher.
    #[serde(rename = "CbteDesde", default)]
    pub voucher_number: Option<u64>,
    #[serde(rename = "Observaciones", default)]
    pub observations: Vec<AuthorityMessage>,
    #[serde(rename = "Errores", default)]
    pub errors: Vec<AuthorityMessage>,
}

impl AuthorityReply {
    pub fn is_approved(&self) -> bool {
        self.result.as_deref() == Some("A")
    }
}

/// A voucher as stored by the authority (`FECompConsultar`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VoucherRecord {
    #[serde(rename = "CbteTipo")]
    pub voucher_type: u16,
    #[serde(rename = "PtoVta")]
    pub sales_point: u32,
    #[serde(rename = "CbteDesde")]
    pub number: u64,
    #[serde(rename = "CbteFch", default)]
    pub date: Option<String>,
    #[serde(rename = "DocTipo", default)]
    pub document_type: Option<u16>,
    #[serde(rename = "DocNro", default)]
    pub document_number: Option<u64>,
    #[serde(rename = "ImpTotal", default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
    #[serde(rename = "CodAutorizacion", default)]
    pub authorization_code: Option<String>,
    #[serde(rename = "FchVto", default)]
    pub authorization_expiry: Option<String>,
    #[serde(rename = "Resultado", default)]
    pub result: Option<String>,
}

/// Parameter table row (`FEParamGet*`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Desc")]
    pub description: String,
    #[serde(rename = "FchDesde", default)]
    pub valid_from: Option<String>,
    #[serde(rename = "FchHasta", default)]
    pub valid_to: Option<String>,
}

/// Sales point enabled for electronic invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesPointInfo {
    #[serde(rename = "Nro")]
    pub number: u32,
    #[serde(rename = "EmisionTipo")]
    pub emission_type: String,
    #[serde(rename = "Bloqueado")]
    pub blocked: String,
    #[serde(rename = "FchBaja", default)]
    pub deactivated_on: Option<String>,
}

/// Health of the authority's servers (`FEDummy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(rename = "AppServer")]
    pub app_server: String,
    #[serde(rename = "DbServer")]
    pub db_server: String,
    #[serde(rename = "AuthServer")]
    pub auth_server: String,
}

impl ServerStatus {
    pub fn is_operational(&self) -> bool {
        [&self.app_server, &self.db_server, &self.auth_server]
            .iter()
            .all(|s| s.eq_ignore_ascii_case("OK"))
    }
}

/// Remote electronic-invoicing service.
///
/// Implementations wrap the authority's SDK or web service. Calls are not
/// retried by the pipeline.
#[async_trait]
pub trait VoucherService: Send + Sync {
    /// Last voucher number issued for the (sales point, voucher type) pair.
    async fn last_voucher_number(
        &self,
        sales_point: u32,
        voucher_type: VoucherType,
    ) -> Result<u64, AuthorityError>;

    /// Submit a voucher for authorization. With `return_full` the reply
    /// carries result, number and observations, not just CAE and expiry.
    async fn submit_voucher(
        &self,
        payload: &WireInvoicePayload,
        return_full: bool,
    ) -> Result<AuthorityReply, AuthorityError>;

    /// Look up an issued voucher; `None` when the authority has no record.
    async fn voucher_info(
        &self,
        number: u64,
        sales_point: u32,
        voucher_type: VoucherType,
    ) -> Result<Option<VoucherRecord>, AuthorityError>;

    async fn voucher_types(&self) -> Result<Vec<CatalogEntry>, AuthorityError>;

    async fn document_types(&self) -> Result<Vec<CatalogEntry>, AuthorityError>;

    async fn aliquot_types(&self) -> Result<Vec<CatalogEntry>, AuthorityError>;

    async fn sales_points(&self) -> Result<Vec<SalesPointInfo>, AuthorityError>;

    async fn server_status(&self) -> Result<ServerStatus, AuthorityError>;
}
