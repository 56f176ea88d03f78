//! Issuance pipeline: validate, number, transform, re-validate, submit.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::config::InvoicingConfig;
use super::error::InvoicingError;
use super::numbering::{SequenceKey, SequenceLocks, assign_next_number};
use super::payload::{WireInvoicePayload, transform};
use super::response::{InvoiceOutcome, format_authority_response};
use super::service::{
    AuthorityError, CatalogEntry, SalesPointInfo, ServerStatus, VoucherRecord, VoucherService,
};
use super::validate::validate_payload_within;
use crate::core::{
    InvoiceRequest, ValidationError, ValidationResult, VoucherType, validate_request_within,
    validate_sales_point,
};

/// States of a single issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStage {
    ValidatingInput,
    NumberingInProgress,
    Transforming,
    ValidatingStructure,
    Submitting,
    FormattingResponse,
    Done,
    Failed,
}

impl fmt::Display for InvoiceStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ValidatingInput => "input validation",
            Self::NumberingInProgress => "numbering",
            Self::Transforming => "transformation",
            Self::ValidatingStructure => "structural validation",
            Self::Submitting => "submission",
            Self::FormattingResponse => "response formatting",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Tracks and logs stage transitions of one issuance.
struct Progress {
    stage: InvoiceStage,
}

impl Progress {
    fn start() -> Self {
        debug!(stage = %InvoiceStage::ValidatingInput, "pipeline started");
        Self {
            stage: InvoiceStage::ValidatingInput,
        }
    }

    fn enter(&mut self, next: InvoiceStage) {
        debug!(from = %self.stage, to = %next, "pipeline transition");
        self.stage = next;
    }

    fn authority(&self, source: AuthorityError) -> InvoicingError {
        InvoicingError::Authority {
            stage: self.stage,
            source,
        }
    }

    fn fail(&mut self, err: InvoicingError) -> InvoicingError {
        match &err {
            InvoicingError::InputValidation(result) | InvoicingError::StructuralValidation(result) => {
                warn!(stage = %self.stage, errors = result.errors.len(), error = %err, "invoice rejected locally");
            }
            _ => error!(stage = %self.stage, error = %err, "invoice issuance failed"),
        }
        self.stage = InvoiceStage::Failed;
        err
    }
}

/// Orchestrates issuance against a [`VoucherService`].
///
/// Issuances for the same (sales point, voucher type) are serialized from
/// the number lookup through submission; other sequences run concurrently.
pub struct Invoicer<S> {
    service: S,
    config: InvoicingConfig,
    locks: SequenceLocks,
}

impl<S: VoucherService> Invoicer<S> {
    pub fn new(service: S) -> Self {
        Self::with_config(service, InvoicingConfig::default())
    }

    pub fn with_config(service: S, config: InvoicingConfig) -> Self {
        Self {
            service,
            config,
            locks: SequenceLocks::new(),
        }
    }

    /// Build with settings loaded from the config file and environment.
    pub fn from_env(service: S) -> Result<Self, InvoicingError> {
        Ok(Self::with_config(service, InvoicingConfig::load()?))
    }

    pub fn config(&self) -> &InvoicingConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Issue a voucher dated against the local clock.
    pub async fn issue(&self, request: &InvoiceRequest) -> Result<InvoiceOutcome, InvoicingError> {
        self.issue_at(request, Local::now().date_naive()).await
    }

    /// Issue a voucher and obtain its CAE.
    ///
    /// Nothing is sent to the authority when the request fails input
    /// validation, and nothing is submitted when the wire record fails
    /// structural validation.
    pub async fn issue_at(
        &self,
        request: &InvoiceRequest,
        today: NaiveDate,
    ) -> Result<InvoiceOutcome, InvoicingError> {
        let sales_point = self.resolve_sales_point(request);
        let span = info_span!(
            "issue_invoice",
            sales_point,
            voucher_type = request.voucher_type.code()
        );
        self.run_pipeline(request, sales_point, today)
            .instrument(span)
            .await
    }

    async fn run_pipeline(
        &self,
        request: &InvoiceRequest,
        sales_point: u32,
        today: NaiveDate,
    ) -> Result<InvoiceOutcome, InvoicingError> {
        let mut progress = Progress::start();

        let input = self.validate_input(request, sales_point, today);
        if !input.is_valid() {
            return Err(progress.fail(InvoicingError::InputValidation(input)));
        }

        let key = SequenceKey::new(sales_point, request.voucher_type);
        let guard = self.locks.acquire(key).await;
        debug!(sequence = %key, "sequence lock acquired");

        progress.enter(InvoiceStage::NumberingInProgress);
        let number = match assign_next_number(&self.service, sales_point, request.voucher_type).await {
            Ok(number) => number,
            Err(source) => {
                let err = progress.authority(source);
                return Err(progress.fail(err));
            }
        };

        progress.enter(InvoiceStage::Transforming);
        let payload = transform(request, number, sales_point, today);

        progress.enter(InvoiceStage::ValidatingStructure);
        let structural = validate_payload_within(&payload, today, self.config.date_window_days);
        if !structural.is_valid() {
            return Err(progress.fail(InvoicingError::StructuralValidation(structural)));
        }

        progress.enter(InvoiceStage::Submitting);
        let reply = match self
            .service
            .submit_voucher(&payload, self.config.return_full_reply)
            .await
        {
            Ok(reply) => reply,
            Err(source) => {
                let err = progress.authority(source);
                return Err(progress.fail(err));
            }
        };
        drop(guard);

        if !reply.is_approved() {
            let messages = reply
                .errors
                .iter()
                .chain(reply.observations.iter())
                .cloned()
                .collect();
            let err = progress.authority(AuthorityError::Rejected { messages });
            return Err(progress.fail(err));
        }

        progress.enter(InvoiceStage::FormattingResponse);
        let outcome = format_authority_response(&reply, &payload);

        progress.enter(InvoiceStage::Done);
        info!(
            number = outcome.voucher.number,
            cae = %outcome.authorization.code,
            total = %outcome.amounts.total,
            "voucher authorized"
        );
        Ok(outcome)
    }

    /// Run validation, numbering and transformation without submitting.
    ///
    /// The number is only a preview: no sequence lock is held, so a
    /// concurrent issuance may take it first.
    pub async fn prepare(
        &self,
        request: &InvoiceRequest,
        today: NaiveDate,
    ) -> Result<WireInvoicePayload, InvoicingError> {
        let sales_point = self.resolve_sales_point(request);

        let input = self.validate_input(request, sales_point, today);
        if !input.is_valid() {
            return Err(InvoicingError::InputValidation(input));
        }

        let number = assign_next_number(&self.service, sales_point, request.voucher_type)
            .await
            .map_err(|source| InvoicingError::Authority {
                stage: InvoiceStage::NumberingInProgress,
                source,
            })?;

        let payload = transform(request, number, sales_point, today);
        let structural = validate_payload_within(&payload, today, self.config.date_window_days);
        if !structural.is_valid() {
            return Err(InvoicingError::StructuralValidation(structural));
        }
        debug!(number, sales_point, "voucher prepared");
        Ok(payload)
    }

    /// Look up an issued voucher.
    pub async fn voucher_info(
        &self,
        number: u64,
        sales_point: u32,
        voucher_type: VoucherType,
    ) -> Result<VoucherRecord, InvoicingError> {
        self.service
            .voucher_info(number, sales_point, voucher_type)
            .await?
            .ok_or(InvoicingError::NotFound {
                number,
                sales_point,
                voucher_type: voucher_type.code(),
            })
    }

    pub async fn last_voucher_number(
        &self,
        sales_point: u32,
        voucher_type: VoucherType,
    ) -> Result<u64, InvoicingError> {
        Ok(self.service.last_voucher_number(sales_point, voucher_type).await?)
    }

    pub async fn voucher_types(&self) -> Result<Vec<CatalogEntry>, InvoicingError> {
        Ok(self.service.voucher_types().await?)
    }

    pub async fn document_types(&self) -> Result<Vec<CatalogEntry>, InvoicingError> {
        Ok(self.service.document_types().await?)
    }

    pub async fn aliquot_types(&self) -> Result<Vec<CatalogEntry>, InvoicingError> {
        Ok(self.service.aliquot_types().await?)
    }

    pub async fn sales_points(&self) -> Result<Vec<SalesPointInfo>, InvoicingError> {
        Ok(self.service.sales_points().await?)
    }

    pub async fn server_status(&self) -> Result<ServerStatus, InvoicingError> {
        Ok(self.service.server_status().await?)
    }

    fn resolve_sales_point(&self, request: &InvoiceRequest) -> u32 {
        request.sales_point.unwrap_or(self.config.default_sales_point)
    }

    fn validate_input(
        &self,
        request: &InvoiceRequest,
        sales_point: u32,
        today: NaiveDate,
    ) -> ValidationResult {
        let mut result = validate_request_within(request, today, self.config.date_window_days);
        // An explicit sales point was already checked; the configured default was not.
        if request.sales_point.is_none() {
            if let Err(e) = validate_sales_point(sales_point) {
                result.push(ValidationError::new("salesPoint", e.reason));
            }
        }
        result
    }
}
