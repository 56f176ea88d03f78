//! Fluent construction of invoice requests.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::codes::{Concept, VoucherType};
use super::error::FacturaError;
use super::types::*;
use super::validation;

/// Builder for constructing invoice requests.
///
/// ```
/// use afip_factura::core::*;
/// use rust_decimal_macros::dec;
///
/// let request = InvoiceRequestBuilder::new(
///     VoucherType::InvoiceB,
///     Concept::Products,
///     Customer::final_consumer(),
/// )
/// .sales_point(3)
/// .add_item(LineItem::new("Yerba 1kg", dec!(2), dec!(100), VatAliquot::TwentyOne))
/// .build_unchecked();
///
/// assert_eq!(compute_totals(&request.items, request.customer.vat_condition).total, dec!(242.00));
/// ```
pub struct InvoiceRequestBuilder {
    voucher_type: VoucherType,
    concept: Concept,
    customer: Customer,
    sales_point: Option<u32>,
    items: Vec<LineItem>,
    date: Option<InvoiceDate>,
    currency: Option<String>,
    exchange_rate: Option<Decimal>,
    service_date_from: Option<InvoiceDate>,
    service_date_to: Option<InvoiceDate>,
    due_date: Option<InvoiceDate>,
    associated_vouchers: Vec<AssociatedVoucher>,
    taxes: Vec<OtherTax>,
    extras: Map<String, Value>,
}

impl InvoiceRequestBuilder {
    pub fn new(voucher_type: VoucherType, concept: Concept, customer: Customer) -> Self {
        Self {
            voucher_type,
            concept,
            customer,
            sales_point: None,
            items: Vec::new(),
            date: None,
            currency: None,
            exchange_rate: None,
            service_date_from: None,
            service_date_to: None,
            due_date: None,
            associated_vouchers: Vec::new(),
            taxes: Vec::new(),
            extras: Map::new(),
        }
    }

    pub fn sales_point(mut self, sales_point: u32) -> Self {
        self.sales_point = Some(sales_point);
        self
    }

    pub fn add_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn date(mut self, date: impl Into<InvoiceDate>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Foreign currency with its exchange rate against pesos.
    pub fn currency(mut self, id: impl Into<String>, exchange_rate: Decimal) -> Self {
        self.currency = Some(id.into());
        self.exchange_rate = Some(exchange_rate);
        self
    }

    pub fn service_period(mut self, from: impl Into<InvoiceDate>, to: impl Into<InvoiceDate>) -> Self {
        self.service_date_from = Some(from.into());
        self.service_date_to = Some(to.into());
        self
    }

    pub fn due_date(mut self, date: impl Into<InvoiceDate>) -> Self {
        self.due_date = Some(date.into());
        self
    }

    pub fn associate(mut self, voucher: AssociatedVoucher) -> Self {
        self.associated_vouchers.push(voucher);
        self
    }

    pub fn add_tax(mut self, tax: OtherTax) -> Self {
        self.taxes.push(tax);
        self
    }

    /// Extra authority field copied verbatim into the wire record.
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Build the request and validate it against today's date.
    /// Returns all validation errors (not just the first).
    pub fn build(self) -> Result<InvoiceRequest, FacturaError> {
        self.build_at(Local::now().date_naive())
    }

    /// Build the request and validate it against the given date.
    pub fn build_at(self, today: NaiveDate) -> Result<InvoiceRequest, FacturaError> {
        let request = self.build_unchecked();
        let result = validation::validate_request(&request, today);
        if !result.is_valid() {
            return Err(FacturaError::InvalidRequest(result));
        }
        Ok(request)
    }

    /// Build without validation, e.g. to replay stored requests.
    pub fn build_unchecked(self) -> InvoiceRequest {
        InvoiceRequest {
            voucher_type: self.voucher_type,
            concept: self.concept,
            sales_point: self.sales_point,
            customer: self.customer,
            items: self.items,
            date: self.date,
            currency: self.currency,
            exchange_rate: self.exchange_rate,
            service_date_from: self.service_date_from,
            service_date_to: self.service_date_to,
            due_date: self.due_date,
            associated_vouchers: self.associated_vouchers,
            taxes: self.taxes,
            extras: if self.extras.is_empty() {
                None
            } else {
                Some(self.extras)
            },
        }
    }
}
