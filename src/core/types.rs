use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::codes::{Concept, DocumentType, VatAliquot, VatCondition, VoucherType};
use super::identity::{numeric_date, parse_numeric_date};

/// Friendly invoice description handed to the pipeline by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    /// Voucher type to issue (`CbteTipo`).
    pub voucher_type: VoucherType,
    /// Goods, services or both (`Concepto`).
    pub concept: Concept,
    /// Sales point; falls back to the configured default when absent.
    #[serde(default)]
    pub sales_point: Option<u32>,
    /// Receiver of the voucher.
    pub customer: Customer,
    /// Invoice lines.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Voucher date; today when absent.
    #[serde(default)]
    pub date: Option<InvoiceDate>,
    /// Authority currency id; `PES` when absent.
    #[serde(default)]
    pub currency: Option<String>,
    /// Exchange rate against pesos; 1 when absent.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Start of the billed service period.
    #[serde(default)]
    pub service_date_from: Option<InvoiceDate>,
    /// End of the billed service period.
    #[serde(default)]
    pub service_date_to: Option<InvoiceDate>,
    /// Payment due date; defaults to `service_date_to` for services.
    #[serde(default)]
    pub due_date: Option<InvoiceDate>,
    /// Vouchers corrected by a credit or debit note.
    #[serde(default)]
    pub associated_vouchers: Vec<AssociatedVoucher>,
    /// Other taxes (tributos) levied on the voucher.
    #[serde(default)]
    pub taxes: Vec<OtherTax>,
    /// Additional authority fields passed through verbatim.
    #[serde(default)]
    pub extras: Option<Map<String, Value>>,
}

/// Receiver identification and VAT status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub document_type: DocumentType,
    /// Document number as typed by the user; may contain separators.
    #[serde(default, deserialize_with = "string_or_number")]
    pub document_number: Option<String>,
    pub vat_condition: VatCondition,
}

impl Customer {
    pub fn new(
        document_type: DocumentType,
        document_number: impl Into<String>,
        vat_condition: VatCondition,
    ) -> Self {
        Self {
            document_type,
            document_number: Some(document_number.into()),
            vat_condition,
        }
    }

    /// Anonymous final consumer (document type 99, number 0).
    pub fn final_consumer() -> Self {
        Self {
            document_type: DocumentType::FinalConsumer,
            document_number: Some("0".into()),
            vat_condition: VatCondition::FinalConsumer,
        }
    }

    /// Document number with separators removed, as the authority expects.
    /// Absent or non-numeric numbers become 0.
    pub fn document_number_digits(&self) -> u64 {
        self.document_number
            .as_deref()
            .map(|n| n.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0)
    }
}

/// A single invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    /// Unit price without VAT.
    pub unit_price: Decimal,
    pub vat_aliquot_id: VatAliquot,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        vat_aliquot_id: VatAliquot,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            vat_aliquot_id,
        }
    }
}

/// A date given either in numeric `YYYYMMDD` form or as a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InvoiceDate {
    Numeric(u32),
    Calendar(NaiveDate),
}

impl InvoiceDate {
    /// Numeric `YYYYMMDD` form. Numeric dates are returned as given.
    pub fn to_numeric(&self) -> u32 {
        match self {
            Self::Numeric(n) => *n,
            Self::Calendar(d) => numeric_date(*d),
        }
    }

    /// Calendar form, if the numeric value is a real date.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Numeric(n) => parse_numeric_date(*n),
            Self::Calendar(d) => Some(*d),
        }
    }
}

impl From<NaiveDate> for InvoiceDate {
    fn from(date: NaiveDate) -> Self {
        Self::Calendar(date)
    }
}

impl From<u32> for InvoiceDate {
    fn from(value: u32) -> Self {
        Self::Numeric(value)
    }
}

/// Reference to a previously issued voucher (`CbtesAsoc` entry).
///
/// Serialised with the authority's field names; the friendly camelCase
/// names are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssociatedVoucher {
    #[serde(rename = "Tipo", alias = "type", default, skip_serializing_if = "Option::is_none")]
    pub voucher_type: Option<u16>,
    #[serde(rename = "PtoVta", alias = "salesPoint", default, skip_serializing_if = "Option::is_none")]
    pub sales_point: Option<u32>,
    #[serde(rename = "Nro", alias = "number", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,
    /// Issuer CUIT of the referenced voucher.
    #[serde(rename = "Cuit", alias = "cuit", default, skip_serializing_if = "Option::is_none")]
    pub cuit: Option<String>,
    /// Date of the referenced voucher (`YYYYMMDD`).
    #[serde(rename = "CbteFch", alias = "date", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<u32>,
}

impl AssociatedVoucher {
    pub fn new(voucher_type: VoucherType, sales_point: u32, number: u64) -> Self {
        Self {
            voucher_type: Some(voucher_type.code()),
            sales_point: Some(sales_point),
            number: Some(number),
            cuit: None,
            date: None,
        }
    }
}

/// Other tax levied on the voucher (`Tributos` entry), e.g. gross income perceptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherTax {
    #[serde(rename = "Id", alias = "id")]
    pub id: u16,
    #[serde(rename = "Desc", alias = "description", default)]
    pub description: String,
    #[serde(rename = "BaseImp", alias = "base", with = "rust_decimal::serde::float")]
    pub base: Decimal,
    #[serde(rename = "Alic", alias = "rate", with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(rename = "Importe", alias = "amount", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// VAT subtotal for one aliquot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdownEntry {
    pub aliquot_id: VatAliquot,
    pub taxable_base: Decimal,
    pub amount: Decimal,
}

/// Net, VAT and gross totals of a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub net: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
