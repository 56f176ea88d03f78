//! VAT computation and aggregation.
//!
//! Rounding happens at each intermediate step, not once at the end: VAT
//! is rounded per line, then every aliquot group and every total is
//! rounded again on output. Changing that order moves some totals by a
//! cent relative to what the authority recomputes.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::codes::{VatAliquot, VatCondition};
use super::types::{LineItem, TaxBreakdownEntry, Totals};

/// Round to cents, half away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Unrounded net amount of a line (`quantity * unit_price`). Validated
/// requests keep it within [`MAX_AMOUNT`](crate::core::MAX_AMOUNT).
pub fn line_net(item: &LineItem) -> Decimal {
    item.quantity * item.unit_price
}

/// VAT on `net` at the given aliquot, rounded to cents.
pub fn compute_vat(net: Decimal, aliquot: VatAliquot) -> Decimal {
    round2(net * aliquot.percentage() / dec!(100))
}

/// Group lines by aliquot, ordered by ascending aliquot id.
///
/// Exempt receivers are charged no VAT, so the result is empty for them.
pub fn group_by_aliquot(items: &[LineItem], condition: VatCondition) -> Vec<TaxBreakdownEntry> {
    if condition.is_exempt() {
        return Vec::new();
    }

    let mut groups: BTreeMap<u16, (VatAliquot, Decimal, Decimal)> = BTreeMap::new();
    for item in items {
        let net = line_net(item);
        let aliquot = item.vat_aliquot_id;
        let entry = groups
            .entry(aliquot.code())
            .or_insert((aliquot, Decimal::ZERO, Decimal::ZERO));
        entry.1 += net;
        entry.2 += compute_vat(net, aliquot);
    }

    groups
        .into_values()
        .map(|(aliquot_id, base, amount)| TaxBreakdownEntry {
            aliquot_id,
            taxable_base: round2(base),
            amount: round2(amount),
        })
        .collect()
}

/// Net, VAT and gross totals for a set of lines.
pub fn compute_totals(items: &[LineItem], condition: VatCondition) -> Totals {
    let exempt = condition.is_exempt();
    let mut net = Decimal::ZERO;
    let mut vat = Decimal::ZERO;

    for item in items {
        let line = line_net(item);
        net += line;
        if !exempt {
            vat += compute_vat(line, item.vat_aliquot_id);
        }
    }

    Totals {
        net: round2(net),
        vat: round2(vat),
        total: round2(net + vat),
    }
}
