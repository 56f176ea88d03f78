//! Property-based tests for identifiers, VAT totals and the wire record.
//!
//! Run with: `cargo test --test proptest_tests`

use chrono::NaiveDate;
use afip_factura::core::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn aliquot() -> impl Strategy<Value = VatAliquot> {
    prop::sample::select(VatAliquot::ALL.to_vec())
}

fn line_item() -> impl Strategy<Value = LineItem> {
    (1u32..50, 1i64..5_000_000, aliquot()).prop_map(|(qty, cents, aliquot)| {
        LineItem::new("Item", Decimal::from(qty), Decimal::new(cents, 2), aliquot)
    })
}

/// Weighed goods: quantities with up to three decimals (1.5 kg, 0.375 kg).
fn fractional_line_item() -> impl Strategy<Value = LineItem> {
    (1i64..50_000, 1i64..5_000_000, aliquot()).prop_map(|(milli, cents, aliquot)| {
        LineItem::new("Item", Decimal::new(milli, 3), Decimal::new(cents, 2), aliquot)
    })
}

fn items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item(), 1..12)
}

fn mixed_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(prop_oneof![line_item(), fractional_line_item()], 1..12)
}

proptest! {
    #[test]
    fn computed_check_digit_always_validates(prefix in "[0-9]{10}") {
        let digit = tax_id_check_digit(&prefix).unwrap();
        let id = format!("{prefix}{digit}");
        prop_assert!(validate_tax_id(&id).is_ok());

        let wrong = (digit + 1) % 10;
        let wrong_id = format!("{prefix}{wrong}");
        prop_assert!(validate_tax_id(&wrong_id).is_err());
    }

    #[test]
    fn total_is_net_plus_vat(items in items()) {
        let totals = compute_totals(&items, VatCondition::Registered);
        prop_assert_eq!(totals.total, totals.net + totals.vat);
        prop_assert!(totals.vat >= Decimal::ZERO);
    }

    #[test]
    fn exemption_removes_vat_only(items in items()) {
        let registered = compute_totals(&items, VatCondition::Registered);
        let exempt = compute_totals(&items, VatCondition::Exempt);
        prop_assert_eq!(exempt.net, registered.net);
        prop_assert_eq!(exempt.vat, Decimal::ZERO);
        prop_assert_eq!(exempt.total, exempt.net);
        prop_assert!(group_by_aliquot(&items, VatCondition::Exempt).is_empty());
    }

    #[test]
    fn breakdown_adds_up_to_totals(items in items()) {
        let totals = compute_totals(&items, VatCondition::FinalConsumer);
        let groups = group_by_aliquot(&items, VatCondition::FinalConsumer);

        let base: Decimal = groups.iter().map(|g| g.taxable_base).sum();
        let vat: Decimal = groups.iter().map(|g| g.amount).sum();
        prop_assert_eq!(base, totals.net);
        prop_assert_eq!(vat, totals.vat);

        let ids: Vec<u16> = groups.iter().map(|g| g.aliquot_id.code()).collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]), "{:?}", ids);
    }

    #[test]
    fn fractional_breakdown_keeps_rounding_order(items in mixed_items()) {
        let totals = compute_totals(&items, VatCondition::Registered);
        let groups = group_by_aliquot(&items, VatCondition::Registered);

        // VAT is rounded per line, so the groups add up exactly.
        let vat: Decimal = groups.iter().map(|g| g.amount).sum();
        prop_assert_eq!(vat, totals.vat);
        prop_assert_eq!(totals.total, totals.net + totals.vat);

        // Bases and net are rounded separately, half a cent each at most.
        let base: Decimal = groups.iter().map(|g| g.taxable_base).sum();
        let raw: Decimal = items.iter().map(|i| i.quantity * i.unit_price).sum();
        let slack = Decimal::new(5, 3) * Decimal::from(groups.len() + 1);
        prop_assert!((base - totals.net).abs() <= slack, "{} vs {}", base, totals.net);
        prop_assert!((totals.net - raw).abs() <= Decimal::new(5, 3));
    }

    #[test]
    fn valid_builder_output_passes_validation(items in items(), sales_point in 1u32..=9999) {
        let mut builder = InvoiceRequestBuilder::new(
            VoucherType::InvoiceB,
            Concept::Products,
            Customer::final_consumer(),
        )
        .sales_point(sales_point);
        for item in items {
            builder = builder.add_item(item);
        }
        prop_assert!(builder.build_at(today()).is_ok());
    }
}

#[cfg(feature = "wsfe")]
mod wire {
    use super::*;
    use afip_factura::wsfe::{transform, validate_payload};

    fn condition() -> impl Strategy<Value = VatCondition> {
        prop::sample::select(vec![
            VatCondition::Exempt,
            VatCondition::FinalConsumer,
            VatCondition::SmallTaxpayer,
            VatCondition::Unregistered,
        ])
    }

    proptest! {
        #[test]
        fn transformed_requests_are_structurally_valid(
            items in mixed_items(),
            condition in condition(),
            number in 1u64..100_000_000,
        ) {
            let mut builder = InvoiceRequestBuilder::new(
                VoucherType::InvoiceB,
                Concept::Products,
                Customer::new(DocumentType::Cuit, "20409378472", condition),
            );
            for item in items {
                builder = builder.add_item(item);
            }
            let request = builder.build_at(today()).unwrap();

            let payload = transform(&request, number, 1, today());
            let result = validate_payload(&payload, today());
            prop_assert!(result.is_valid(), "{}", result);
            prop_assert_eq!(
                payload.total_amount,
                payload.net_amount + payload.vat_amount + payload.other_taxes_amount
            );
        }
    }
}
