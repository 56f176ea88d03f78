//! Authority wire record (`FECAEDetRequest` plus header) and the
//! transformer that builds it from a friendly request.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{
    AssociatedVoucher, DEFAULT_CURRENCY, EXEMPT_ALIQUOT, InvoiceRequest, OtherTax,
    TaxBreakdownEntry, compute_totals, group_by_aliquot, numeric_date, round2,
};

/// One `Iva` entry: taxable base and VAT amount for an aliquot id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatEntry {
    #[serde(rename = "Id")]
    pub aliquot_id: u16,
    #[serde(rename = "BaseImp", with = "rust_decimal::serde::float")]
    pub taxable_base: Decimal,
    #[serde(rename = "Importe", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl From<TaxBreakdownEntry> for VatEntry {
    fn from(entry: TaxBreakdownEntry) -> Self {
        Self {
            aliquot_id: entry.aliquot_id.code(),
            taxable_base: entry.taxable_base,
            amount: entry.amount,
        }
    }
}

/// The exact record submitted to the authority for one voucher.
///
/// Coded fields are raw integers so that records built elsewhere can be
/// checked by [`validate_payload`](super::validate_payload) before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireInvoicePayload {
    /// Number of vouchers in the batch. Always 1.
    #[serde(rename = "CantReg")]
    pub record_count: u32,
    #[serde(rename = "PtoVta")]
    pub sales_point: u32,
    #[serde(rename = "CbteTipo")]
    pub voucher_type: u16,
    #[serde(rename = "Concepto")]
    pub concept: u16,
    #[serde(rename = "DocTipo")]
    pub document_type: u16,
    #[serde(rename = "DocNro")]
    pub document_number: u64,
    #[serde(rename = "CbteDesde")]
    pub voucher_number_from: u64,
    #[serde(rename = "CbteHasta")]
    pub voucher_number_to: u64,
    /// Voucher date, `YYYYMMDD`.
    #[serde(rename = "CbteFch", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<u32>,
    #[serde(rename = "ImpTotal", with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Amount not subject to VAT (`ImpTotConc`).
    #[serde(rename = "ImpTotConc", with = "rust_decimal::serde::float")]
    pub non_taxed_amount: Decimal,
    #[serde(rename = "ImpNeto", with = "rust_decimal::serde::float")]
    pub net_amount: Decimal,
    /// Exempt operations (`ImpOpEx`).
    #[serde(rename = "ImpOpEx", with = "rust_decimal::serde::float")]
    pub exempt_amount: Decimal,
    #[serde(rename = "ImpIVA", with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,
    /// Sum of `Tributos` (`ImpTrib`).
    #[serde(rename = "ImpTrib", with = "rust_decimal::serde::float")]
    pub other_taxes_amount: Decimal,
    #[serde(rename = "MonId")]
    pub currency: String,
    #[serde(rename = "MonCotiz", with = "rust_decimal::serde::float")]
    pub exchange_rate: Decimal,
    #[serde(rename = "CondicionIVAReceptorId")]
    pub receiver_vat_condition_id: u16,
    #[serde(rename = "Iva", default, skip_serializing_if = "Option::is_none")]
    pub vat_breakdown: Option<Vec<VatEntry>>,
    #[serde(rename = "CbtesAsoc", default, skip_serializing_if = "Option::is_none")]
    pub associated_vouchers: Option<Vec<AssociatedVoucher>>,
    #[serde(rename = "Tributos", default, skip_serializing_if = "Option::is_none")]
    pub other_taxes: Option<Vec<OtherTax>>,
    #[serde(rename = "FchServDesde", default, skip_serializing_if = "Option::is_none")]
    pub service_date_from: Option<u32>,
    #[serde(rename = "FchServHasta", default, skip_serializing_if = "Option::is_none")]
    pub service_date_to: Option<u32>,
    #[serde(rename = "FchVtoPago", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<u32>,
    /// Extra authority fields copied verbatim from the request.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// Build the wire record for `request` under the assigned number and sales point.
///
/// `today` resolves the voucher date when the request has none. The
/// record is not validated here; see [`validate_payload`](super::validate_payload).
pub fn transform(
    request: &InvoiceRequest,
    voucher_number: u64,
    sales_point: u32,
    today: NaiveDate,
) -> WireInvoicePayload {
    let condition = request.customer.vat_condition;
    let totals = compute_totals(&request.items, condition);
    let breakdown = group_by_aliquot(&request.items, condition);

    let other_taxes_amount = round2(request.taxes.iter().map(|t| t.amount).sum());

    let vat_breakdown = if condition.is_exempt() {
        // Exempt receivers are reported with a single 0% entry covering the net.
        (totals.net > Decimal::ZERO).then(|| {
            vec![VatEntry {
                aliquot_id: EXEMPT_ALIQUOT.code(),
                taxable_base: totals.net,
                amount: Decimal::ZERO,
            }]
        })
    } else if breakdown.is_empty() {
        None
    } else {
        Some(breakdown.into_iter().map(VatEntry::from).collect())
    };

    let date = request
        .date
        .map(|d| d.to_numeric())
        .unwrap_or_else(|| numeric_date(today));

    let service_date_from = request.service_date_from.map(|d| d.to_numeric());
    let service_date_to = request.service_date_to.map(|d| d.to_numeric());
    let due_date = request
        .due_date
        .map(|d| d.to_numeric())
        .or(service_date_to);

    WireInvoicePayload {
        record_count: 1,
        sales_point,
        voucher_type: request.voucher_type.code(),
        concept: request.concept.code(),
        document_type: request.customer.document_type.code(),
        document_number: request.customer.document_number_digits(),
        voucher_number_from: voucher_number,
        voucher_number_to: voucher_number,
        date: Some(date),
        total_amount: round2(totals.total + other_taxes_amount),
        non_taxed_amount: Decimal::ZERO,
        net_amount: totals.net,
        exempt_amount: Decimal::ZERO,
        vat_amount: totals.vat,
        other_taxes_amount,
        currency: request
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        exchange_rate: request.exchange_rate.unwrap_or(Decimal::ONE),
        receiver_vat_condition_id: condition.code(),
        vat_breakdown,
        associated_vouchers: (!request.associated_vouchers.is_empty())
            .then(|| request.associated_vouchers.clone()),
        other_taxes: (!request.taxes.is_empty()).then(|| request.taxes.clone()),
        service_date_from,
        service_date_to,
        due_date,
        extras: request.extras.clone().unwrap_or_default(),
    }
}
