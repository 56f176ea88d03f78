#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are fine, panics are bugs.
        let _ = afip_factura::validate_tax_id(s);
        let _ = afip_factura::validate_national_id(s);
    }
});
