//! Cross-field checks on the wire record before it is submitted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::payload::WireInvoicePayload;
use crate::core::*;

/// Tolerance for amount consistency checks.
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Rounding slack each `Iva` entry adds to the sum of bases. Every group base
/// and the net are rounded to the cent separately, each off by at most half a cent.
pub const BASE_ROUNDING_PER_ENTRY: Decimal = dec!(0.005);

fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= AMOUNT_TOLERANCE
}

/// Validate a wire record against the default date window.
pub fn validate_payload(payload: &WireInvoicePayload, today: NaiveDate) -> ValidationResult {
    validate_payload_within(payload, today, DATE_WINDOW_DAYS)
}

/// Validate a wire record: required fields, code tables, identifier
/// checksums, amount formats, totals/VAT consistency, exemption rules,
/// credit/debit note associations, service periods and the voucher type /
/// receiver condition combination. Returns all errors found.
pub fn validate_payload_within(
    payload: &WireInvoicePayload,
    today: NaiveDate,
    window_days: i64,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    if payload.record_count != 1 {
        result.push(ValidationError::new(
            "CantReg",
            format!("only single-voucher batches are supported, got {}", payload.record_count),
        ));
    }

    if let Err(e) = validate_sales_point(payload.sales_point) {
        result.push(ValidationError::new("PtoVta", e.reason));
    }

    let voucher_type = VoucherType::from_code(payload.voucher_type);
    if voucher_type.is_none() {
        result.push(ValidationError::new(
            "CbteTipo",
            format!("unknown voucher type {}", payload.voucher_type),
        ));
    }

    let concept = Concept::from_code(payload.concept);
    if concept.is_none() {
        result.push(ValidationError::new(
            "Concepto",
            format!("unknown concept {} (expected 1, 2 or 3)", payload.concept),
        ));
    }

    let condition = VatCondition::from_code(payload.receiver_vat_condition_id);
    if condition.is_none() {
        result.push(ValidationError::new(
            "CondicionIVAReceptorId",
            format!(
                "unknown receiver VAT condition {}",
                payload.receiver_vat_condition_id
            ),
        ));
    }

    validate_document(payload, &mut result);
    validate_numbering(payload, &mut result);

    if let Some(date) = payload.date {
        if let Err(e) = validate_date_within(date, today, window_days) {
            result.push(ValidationError::new("CbteFch", e.reason));
        }
    }

    validate_currency(payload, &mut result);
    validate_amount_formats(payload, &mut result);
    validate_totals(payload, &mut result);
    validate_vat_breakdown(payload, &mut result);
    validate_other_taxes(payload, &mut result);

    if let Some(condition) = condition {
        if condition.is_exempt() {
            validate_exempt(payload, &mut result);
        }
    }

    if let Some(voucher_type) = voucher_type {
        if voucher_type.requires_associated_vouchers() {
            validate_associations(payload, &mut result);
        }
        if let Some(condition) = condition {
            if !is_valid_voucher_condition_combo(voucher_type, condition) {
                result.push(ValidationError::new(
                    "CondicionIVAReceptorId",
                    format!(
                        "{} cannot be issued to a receiver with VAT condition {}",
                        voucher_type.description(),
                        condition.code()
                    ),
                ));
            }
        }
    }

    if let Some(concept) = concept {
        if concept.requires_service_dates() {
            validate_service_dates(payload, &mut result);
        }
    }

    result
}

fn validate_document(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let Some(document_type) = DocumentType::from_code(payload.document_type) else {
        result.push(ValidationError::new(
            "DocTipo",
            format!("unknown document type {}", payload.document_type),
        ));
        return;
    };

    if payload.document_number == 0 {
        if document_type != DocumentType::FinalConsumer {
            result.push(ValidationError::new(
                "DocNro",
                "document number is required for identified receivers",
            ));
        }
        return;
    }

    let number = payload.document_number.to_string();
    let check = if document_type.uses_tax_id_checksum() {
        validate_tax_id(&number).map(|_| ())
    } else if document_type.is_national_id() {
        validate_national_id(&number).map(|_| ())
    } else {
        Ok(())
    };
    if let Err(e) = check {
        result.push(ValidationError::with_rule("DocNro", e.reason, RULE_CHECKSUM));
    }
}

fn validate_numbering(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    if payload.voucher_number_from == 0 {
        result.push(ValidationError::new(
            "CbteDesde",
            "voucher number must be at least 1",
        ));
    }
    if payload.voucher_number_from != payload.voucher_number_to {
        result.push(ValidationError::new(
            "CbteHasta",
            format!(
                "voucher range {}..{} must cover exactly one voucher",
                payload.voucher_number_from, payload.voucher_number_to
            ),
        ));
    }
}

fn validate_currency(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    if payload.currency.trim().is_empty() {
        result.push(ValidationError::new("MonId", "currency id must not be empty"));
    } else if !is_known_currency_id(&payload.currency) {
        result.push(ValidationError::new(
            "MonId",
            format!("currency id '{}' is not a known authority currency", payload.currency),
        ));
    }

    if payload.exchange_rate <= Decimal::ZERO {
        result.push(ValidationError::new(
            "MonCotiz",
            "exchange rate must be greater than zero",
        ));
    }
}

fn validate_amount_formats(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let amounts = [
        (payload.total_amount, "ImpTotal"),
        (payload.non_taxed_amount, "ImpTotConc"),
        (payload.net_amount, "ImpNeto"),
        (payload.exempt_amount, "ImpOpEx"),
        (payload.vat_amount, "ImpIVA"),
        (payload.other_taxes_amount, "ImpTrib"),
    ];
    for (amount, field) in amounts {
        if let Err(e) = validate_amount(amount, field) {
            result.push(ValidationError::new(field, e.reason));
        }
    }
}

fn validate_totals(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let expected = payload.net_amount
        + payload.vat_amount
        + payload.non_taxed_amount
        + payload.exempt_amount
        + payload.other_taxes_amount;
    if !within_tolerance(payload.total_amount, expected) {
        result.push(ValidationError::new(
            "ImpTotal",
            format!(
                "total {} does not match net {} + VAT {} + non-taxed {} + exempt {} + other taxes {} = {}",
                payload.total_amount,
                payload.net_amount,
                payload.vat_amount,
                payload.non_taxed_amount,
                payload.exempt_amount,
                payload.other_taxes_amount,
                expected
            ),
        ));
    }
}

fn validate_vat_breakdown(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let entries = payload.vat_breakdown.as_deref().unwrap_or_default();

    if entries.is_empty() {
        if payload.net_amount > Decimal::ZERO {
            result.push(ValidationError::new(
                "Iva",
                "VAT breakdown is required when the net amount is greater than zero",
            ));
        }
        if !payload.vat_amount.is_zero() {
            result.push(ValidationError::new(
                "ImpIVA",
                format!("VAT amount {} has no VAT breakdown", payload.vat_amount),
            ));
        }
        return;
    }

    for (i, entry) in entries.iter().enumerate() {
        if VatAliquot::from_code(entry.aliquot_id).is_none() {
            result.push(ValidationError::new(
                format!("Iva[{i}].Id"),
                format!("unknown VAT aliquot id {}", entry.aliquot_id),
            ));
        }
    }

    let base_sum: Decimal = entries.iter().map(|e| e.taxable_base).sum();
    let base_tolerance =
        AMOUNT_TOLERANCE.max(BASE_ROUNDING_PER_ENTRY * Decimal::from(entries.len() + 1));
    if (base_sum - payload.net_amount).abs() > base_tolerance {
        result.push(ValidationError::new(
            "Iva",
            format!(
                "sum of VAT bases {} does not match net amount {}",
                base_sum, payload.net_amount
            ),
        ));
    }

    let vat_sum: Decimal = entries.iter().map(|e| e.amount).sum();
    if !within_tolerance(vat_sum, payload.vat_amount) {
        result.push(ValidationError::new(
            "Iva",
            format!(
                "sum of VAT amounts {} does not match VAT amount {}",
                vat_sum, payload.vat_amount
            ),
        ));
    }
}

fn validate_other_taxes(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let taxes = payload.other_taxes.as_deref().unwrap_or_default();
    let sum: Decimal = taxes.iter().map(|t| t.amount).sum();
    if !within_tolerance(sum, payload.other_taxes_amount) {
        result.push(ValidationError::new(
            "ImpTrib",
            format!(
                "other taxes amount {} does not match sum of Tributos {}",
                payload.other_taxes_amount, sum
            ),
        ));
    }
}

fn validate_exempt(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let entries = payload.vat_breakdown.as_deref().unwrap_or_default();
    let exempt_id = EXEMPT_ALIQUOT.code();

    if !entries.iter().any(|e| e.aliquot_id == exempt_id) {
        result.push(ValidationError::new(
            "Iva",
            format!("exempt receivers must be reported with the 0% aliquot (id {exempt_id})"),
        ));
    }
    if entries.iter().any(|e| e.aliquot_id != exempt_id) {
        result.push(ValidationError::new(
            "Iva",
            "exempt receivers may only use the 0% aliquot",
        ));
    }
    if !payload.vat_amount.is_zero() {
        result.push(ValidationError::new(
            "ImpIVA",
            format!("VAT amount must be 0 for exempt receivers, got {}", payload.vat_amount),
        ));
    }
}

fn validate_associations(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    let associated = payload.associated_vouchers.as_deref().unwrap_or_default();

    if associated.is_empty() {
        result.push(ValidationError::new(
            "CbtesAsoc",
            "credit and debit notes require at least one comprobante asociado (associated voucher)",
        ));
        return;
    }

    for (i, voucher) in associated.iter().enumerate() {
        let missing: Vec<&str> = [
            ("Tipo", voucher.voucher_type.is_some_and(|t| t > 0)),
            ("PtoVta", voucher.sales_point.is_some_and(|p| p > 0)),
            ("Nro", voucher.number.is_some_and(|n| n > 0)),
        ]
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            result.push(ValidationError::new(
                format!("CbtesAsoc[{i}]"),
                format!("comprobante asociado is missing {}", missing.join(", ")),
            ));
        }
    }
}

fn validate_service_dates(payload: &WireInvoicePayload, result: &mut ValidationResult) {
    if payload.service_date_from.is_none() {
        result.push(ValidationError::new(
            "FchServDesde",
            "service and mixed concepts require a service period start",
        ));
    }
    if payload.service_date_to.is_none() {
        result.push(ValidationError::new(
            "FchServHasta",
            "service and mixed concepts require a service period end",
        ));
    }
    if let (Some(from), Some(to)) = (payload.service_date_from, payload.service_date_to) {
        if from > to {
            result.push(ValidationError::new(
                "FchServDesde",
                format!("service period start {from} is after its end {to}"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wsfe::{VatEntry, transform};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn request(voucher_type: VoucherType, customer: Customer) -> InvoiceRequest {
        InvoiceRequestBuilder::new(voucher_type, Concept::Products, customer)
            .add_item(LineItem::new("Producto 1", dec!(2), dec!(100), VatAliquot::TwentyOne))
            .add_item(LineItem::new("Producto 2", dec!(1), dec!(50), VatAliquot::TwentyOne))
            .build_unchecked()
    }

    fn valid_payload() -> WireInvoicePayload {
        transform(
            &request(VoucherType::InvoiceB, Customer::final_consumer()),
            42,
            1,
            today(),
        )
    }

    #[test]
    fn transformed_payload_is_valid() {
        let result = validate_payload(&valid_payload(), today());
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn exempt_payload_is_valid() {
        let req = request(
            VoucherType::InvoiceB,
            Customer::new(DocumentType::Cuit, "20409378472", VatCondition::Exempt),
        );
        let result = validate_payload(&transform(&req, 1, 1, today()), today());
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn total_mismatch() {
        let mut payload = valid_payload();
        payload.total_amount = dec!(302.52);
        let result = validate_payload(&payload, today());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "ImpTotal");

        payload.total_amount = dec!(302.51);
        assert!(validate_payload(&payload, today()).is_valid());
    }

    #[test]
    fn missing_breakdown_with_net() {
        let mut payload = valid_payload();
        payload.vat_breakdown = None;
        let result = validate_payload(&payload, today());
        assert!(result.mentions("VAT breakdown is required"));
        assert!(result.mentions("has no VAT breakdown"));
    }

    #[test]
    fn breakdown_sums_checked() {
        let mut payload = valid_payload();
        if let Some(entries) = payload.vat_breakdown.as_mut() {
            entries[0].taxable_base = dec!(200);
            entries[0].amount = dec!(42);
        }
        let result = validate_payload(&payload, today());
        assert!(result.mentions("sum of VAT bases"));
        assert!(result.mentions("sum of VAT amounts"));
    }

    #[test]
    fn many_sub_cent_vat_lines_are_valid() {
        // 0.05 * 10.5% rounds to 0.01 per line, well above 10.5% of the group base.
        let mut builder = InvoiceRequestBuilder::new(
            VoucherType::InvoiceB,
            Concept::Products,
            Customer::final_consumer(),
        );
        for _ in 0..250 {
            let item = LineItem::new("Caramelo", dec!(1), dec!(0.05), VatAliquot::TenPointFive);
            builder = builder.add_item(item);
        }
        let request = builder.build_at(today()).unwrap();

        let payload = transform(&request, 7, 1, today());
        assert_eq!(payload.net_amount, dec!(12.50));
        assert_eq!(payload.vat_amount, dec!(2.50));
        let result = validate_payload(&payload, today());
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn base_sum_slack_grows_with_entries() {
        let mut payload = valid_payload();
        let single = payload.vat_breakdown.clone().unwrap();
        payload.vat_breakdown.as_mut().unwrap()[0].taxable_base += dec!(0.02);
        assert!(validate_payload(&payload, today()).mentions("sum of VAT bases"));

        // Four rounded group bases may drift two cents from the rounded net.
        let mut entries = single;
        entries[0].taxable_base = dec!(62.51);
        entries[0].amount = dec!(13.13);
        for (aliquot, base) in [
            (VatAliquot::TenPointFive, dec!(62.51)),
            (VatAliquot::TwentySeven, dec!(62.50)),
            (VatAliquot::Five, dec!(62.50)),
        ] {
            entries.push(VatEntry {
                aliquot_id: aliquot.code(),
                taxable_base: base,
                amount: dec!(0),
            });
        }
        payload.vat_breakdown = Some(entries.clone());
        payload.vat_amount = dec!(13.13);
        payload.total_amount = payload.net_amount + payload.vat_amount;
        let result = validate_payload(&payload, today());
        assert!(result.is_valid(), "{result}");

        entries[3].taxable_base = dec!(62.51);
        payload.vat_breakdown = Some(entries);
        assert!(validate_payload(&payload, today()).mentions("sum of VAT bases"));
    }

    #[test]
    fn exempt_rules() {
        let mut payload = valid_payload();
        payload.receiver_vat_condition_id = VatCondition::Exempt.code();
        let result = validate_payload(&payload, today());
        assert!(result.mentions("0% aliquot (id 3)"));
        assert!(result.mentions("may only use the 0% aliquot"));
        assert!(result.mentions("VAT amount must be 0"));
    }

    #[test]
    fn unknown_codes_reported() {
        let mut payload = valid_payload();
        payload.voucher_type = 4;
        payload.concept = 9;
        payload.document_type = 81;
        payload.receiver_vat_condition_id = 2;
        let result = validate_payload(&payload, today());
        for field in ["CbteTipo", "Concepto", "DocTipo", "CondicionIVAReceptorId"] {
            assert!(result.errors.iter().any(|e| e.field == field), "{field}: {result}");
        }
    }

    #[test]
    fn checksum_on_document_number() {
        let mut payload = valid_payload();
        payload.document_type = DocumentType::Cuit.code();
        payload.document_number = 20409378471;
        let result = validate_payload(&payload, today());
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].is_checksum_failure());
    }

    #[test]
    fn range_must_be_single_voucher() {
        let mut payload = valid_payload();
        payload.voucher_number_to = 43;
        payload.record_count = 2;
        let result = validate_payload(&payload, today());
        assert!(result.errors.iter().any(|e| e.field == "CbteHasta"));
        assert!(result.errors.iter().any(|e| e.field == "CantReg"));
    }

    #[test]
    fn association_entries_need_all_fields() {
        let mut payload = valid_payload();
        payload.voucher_type = VoucherType::CreditNoteB.code();
        payload.associated_vouchers = Some(vec![AssociatedVoucher {
            voucher_type: Some(6),
            ..AssociatedVoucher::default()
        }]);
        let result = validate_payload(&payload, today());
        assert_eq!(result.errors.len(), 1, "{result}");
        assert_eq!(
            result.errors[0].message,
            "comprobante asociado is missing PtoVta, Nro"
        );
    }

    #[test]
    fn other_taxes_must_add_up() {
        let mut payload = valid_payload();
        payload.other_taxes_amount = dec!(5);
        payload.total_amount = dec!(307.50);
        let result = validate_payload(&payload, today());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "ImpTrib");
    }
}
