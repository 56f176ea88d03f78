#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = serde_json::from_slice::<afip_factura::InvoiceRequest>(data) {
        // Must not panic, whatever the codes, dates or amounts.
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        if afip_factura::validate_request(&request, today).is_valid() {
            let condition = request.customer.vat_condition;
            let _ = afip_factura::compute_totals(&request.items, condition);
            let _ = afip_factura::group_by_aliquot(&request.items, condition);
        }
    }
});
