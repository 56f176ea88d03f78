//! Input validation of friendly invoice requests.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::codes::DocumentType;
use super::currencies::is_known_currency_id;
use super::error::{RULE_CHECKSUM, ValidationError, ValidationResult};
use super::identity::{
    DATE_WINDOW_DAYS, MAX_AMOUNT, validate_amount, validate_date_within, validate_national_id,
    validate_sales_point, validate_tax_id,
};
use super::types::{Customer, InvoiceDate, InvoiceRequest, LineItem};

/// Validate a friendly invoice request against the default date window.
pub fn validate_request(request: &InvoiceRequest, today: NaiveDate) -> ValidationResult {
    validate_request_within(request, today, DATE_WINDOW_DAYS)
}

/// Validate a friendly invoice request before any number is requested
/// from the authority. Returns all errors found (not just the first).
///
/// Credit/debit note associations are checked later, on the wire payload.
pub fn validate_request_within(
    request: &InvoiceRequest,
    today: NaiveDate,
    window_days: i64,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Some(sales_point) = request.sales_point {
        if let Err(e) = validate_sales_point(sales_point) {
            result.push(ValidationError::new("salesPoint", e.reason));
        }
    }

    validate_customer(&request.customer, &mut result);

    if request.items.is_empty() {
        result.push(ValidationError::new(
            "items",
            "invoice must have at least one line item",
        ));
    }
    for (i, item) in request.items.iter().enumerate() {
        validate_item(item, i, &mut result);
    }

    if let Some(date) = &request.date {
        if let Err(e) = validate_date_within(date.to_numeric(), today, window_days) {
            result.push(ValidationError::new("date", e.reason));
        }
    }

    if let Some(currency) = &request.currency {
        if !is_known_currency_id(currency) {
            result.push(ValidationError::new(
                "currency",
                format!("currency id '{currency}' is not a known authority currency"),
            ));
        }
    }

    if let Some(rate) = request.exchange_rate {
        if rate <= Decimal::ZERO {
            result.push(ValidationError::new(
                "exchangeRate",
                "exchange rate must be greater than zero",
            ));
        }
    }

    validate_service_period(request, &mut result);

    for (i, tax) in request.taxes.iter().enumerate() {
        for (value, label) in [(tax.base, "base"), (tax.amount, "amount")] {
            if let Err(e) = validate_amount(value, label) {
                result.push(ValidationError::new(format!("taxes[{i}].{label}"), e.reason));
            }
        }
    }

    result
}

fn validate_customer(customer: &Customer, result: &mut ValidationResult) {
    let number = customer
        .document_number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let Some(number) = number else {
        if customer.document_type != DocumentType::FinalConsumer {
            result.push(ValidationError::new(
                "customer.documentNumber",
                "document number is required unless the receiver is an anonymous final consumer",
            ));
        }
        return;
    };

    if customer.document_type.uses_tax_id_checksum() {
        if let Err(e) = validate_tax_id(number) {
            result.push(ValidationError::with_rule(
                "customer.documentNumber",
                e.reason,
                RULE_CHECKSUM,
            ));
        }
    } else if customer.document_type.is_national_id() {
        if let Err(e) = validate_national_id(number) {
            result.push(ValidationError::with_rule(
                "customer.documentNumber",
                e.reason,
                RULE_CHECKSUM,
            ));
        }
    }
}

fn validate_item(item: &LineItem, index: usize, result: &mut ValidationResult) {
    let prefix = format!("items[{index}]");

    if item.description.trim().is_empty() {
        result.push(ValidationError::new(
            format!("{prefix}.description"),
            "description must not be empty",
        ));
    }

    if item.quantity <= Decimal::ZERO {
        result.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "quantity must be greater than zero",
        ));
    }

    if item.unit_price <= Decimal::ZERO {
        result.push(ValidationError::new(
            format!("{prefix}.unitPrice"),
            "unit price must be greater than zero",
        ));
    } else if let Err(e) = validate_amount(item.unit_price, "unit price") {
        result.push(ValidationError::new(format!("{prefix}.unitPrice"), e.reason));
    }

    // Totals and VAT are computed with unchecked arithmetic downstream.
    match item.quantity.checked_mul(item.unit_price) {
        Some(net) if net.abs() <= MAX_AMOUNT => {}
        _ => result.push(ValidationError::new(
            prefix,
            format!("line amount (quantity x unit price) must not exceed {MAX_AMOUNT}"),
        )),
    }
}

fn validate_service_period(request: &InvoiceRequest, result: &mut ValidationResult) {
    if !request.concept.requires_service_dates() {
        return;
    }

    let from = check_service_date(request.service_date_from, "serviceDateFrom", result);
    let to = check_service_date(request.service_date_to, "serviceDateTo", result);

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            result.push(ValidationError::new(
                "serviceDateFrom",
                "service period start must not be after its end",
            ));
        }
    }
}

fn check_service_date(
    date: Option<InvoiceDate>,
    field: &str,
    result: &mut ValidationResult,
) -> Option<NaiveDate> {
    let Some(date) = date else {
        result.push(ValidationError::new(
            field,
            "service and mixed concepts require serviceDateFrom and serviceDateTo",
        ));
        return None;
    };
    let parsed = date.to_date();
    if parsed.is_none() {
        result.push(ValidationError::new(
            field,
            format!("'{}' is not a valid YYYYMMDD date", date.to_numeric()),
        ));
    }
    parsed
}
