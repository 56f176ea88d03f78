//! Normalized outcome of an authorized voucher.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payload::WireInvoicePayload;
use super::service::{AuthorityMessage, AuthorityReply};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherSummary {
    pub number: u64,
    pub sales_point: u32,
    pub voucher_type: u16,
    /// Voucher date, `YYYYMMDD`.
    pub date: Option<u32>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    /// CAE.
    pub code: String,
    /// CAE expiry, `YYYYMMDD`.
    pub expiry: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub document_type: u16,
    pub document_number: u64,
    pub vat_condition: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountSummary {
    pub net: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

/// What the application gets back after a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceOutcome {
    pub voucher: VoucherSummary,
    pub authorization: Authorization,
    pub customer: CustomerSummary,
    pub amounts: AmountSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<AuthorityMessage>,
}

/// Combine the authority's reply with the submitted record.
///
/// The number the authority recorded takes precedence; the submitted
/// number is used when the reply omits it.
pub fn format_authority_response(
    reply: &AuthorityReply,
    payload: &WireInvoicePayload,
) -> InvoiceOutcome {
    InvoiceOutcome {
        voucher: VoucherSummary {
            number: reply.voucher_number.unwrap_or(payload.voucher_number_from),
            sales_point: payload.sales_point,
            voucher_type: payload.voucher_type,
            date: payload.date,
            total: payload.total_amount,
        },
        authorization: Authorization {
            code: reply.cae.clone().unwrap_or_default(),
            expiry: reply.cae_expiry.clone().unwrap_or_default(),
            result: reply.result.clone().unwrap_or_default(),
        },
        customer: CustomerSummary {
            document_type: payload.document_type,
            document_number: payload.document_number,
            vat_condition: payload.receiver_vat_condition_id,
        },
        amounts: AmountSummary {
            net: payload.net_amount,
            vat: payload.vat_amount,
            total: payload.total_amount,
        },
        observations: reply.observations.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::*;
    use crate::wsfe::transform;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn payload() -> WireInvoicePayload {
        let request =
            InvoiceRequestBuilder::new(VoucherType::InvoiceB, Concept::Products, Customer::final_consumer())
                .add_item(LineItem::new("Producto", dec!(2), dec!(100), VatAliquot::TwentyOne))
                .build_unchecked();
        transform(&request, 42, 1, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn reply_fields_mapped() {
        let reply = AuthorityReply {
            cae: Some("74123456789012".into()),
            cae_expiry: Some("20261029".into()),
            result: Some("A".into()),
            voucher_number: Some(42),
            observations: vec![AuthorityMessage {
                code: 10217,
                message: "Observación informativa".into(),
            }],
            errors: vec![],
        };
        let outcome = format_authority_response(&reply, &payload());

        assert_eq!(outcome.voucher.number, 42);
        assert_eq!(outcome.voucher.date, Some(20261019));
        assert_eq!(outcome.authorization.code, "74123456789012");
        assert_eq!(outcome.authorization.expiry, "20261029");
        assert_eq!(outcome.customer.document_type, 99);
        assert_eq!(outcome.amounts.total, dec!(242.00));
        assert_eq!(outcome.observations.len(), 1);
    }

    #[test]
    fn number_falls_back_to_payload() {
        let reply = AuthorityReply {
            cae: Some("74123456789012".into()),
            result: Some("A".into()),
            ..AuthorityReply::default()
        };
        let outcome = format_authority_response(&reply, &payload());
        assert_eq!(outcome.voucher.number, 42);
        assert_eq!(outcome.authorization.expiry, "");
    }
}
