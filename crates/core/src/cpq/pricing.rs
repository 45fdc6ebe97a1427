use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::vehicle::{OptionItem, VanId, VanModel};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub van_id: VanId,
    pub steps: Vec<PricingTraceStep>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub base_price: Decimal,
    pub options_total: Decimal,
    pub total: Decimal,
    pub trace: PricingTrace,
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, van: &VanModel, options: &[&OptionItem]) -> PricingResult;
}

#[derive(Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, van: &VanModel, options: &[&OptionItem]) -> PricingResult {
        price_configuration_with_trace(van, options)
    }
}

pub fn price_configuration(van: &VanModel, options: &[&OptionItem]) -> Decimal {
    van.base_price + options.iter().map(|option| option.delta_price).sum::<Decimal>()
}

pub fn price_configuration_with_trace(van: &VanModel, options: &[&OptionItem]) -> PricingResult {
    let options_total: Decimal = options.iter().map(|option| option.delta_price).sum();
    let total = van.base_price + options_total;

    let mut steps = vec![PricingTraceStep {
        stage: "base".to_string(),
        detail: van.name.clone(),
        amount: van.base_price,
    }];
    steps.extend(options.iter().map(|option| PricingTraceStep {
        stage: "option".to_string(),
        detail: option.name.clone(),
        amount: option.delta_price,
    }));

    PricingResult {
        base_price: van.base_price,
        options_total,
        total,
        trace: PricingTrace { van_id: van.id.clone(), steps },
    }
}

/// Whole-dollar display with thousands separators, e.g. `$109,000`.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if negative {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{format_money, price_configuration, price_configuration_with_trace};
    use crate::cpq::catalog::Catalog;
    use crate::domain::vehicle::{OptionId, VanId};

    #[test]
    fn total_is_base_plus_option_deltas_with_trace() {
        let catalog = Catalog::seeded();
        let van = catalog.van_by_id(&VanId("magma-hopper".to_string())).expect("magma");
        let options = catalog.resolve_options(&[
            OptionId("option-titan-clamp".to_string()),
            OptionId("option-quiet-cab".to_string()),
        ]);

        let result = price_configuration_with_trace(van, &options);
        assert_eq!(result.total, Decimal::from(79_600));
        assert_eq!(result.options_total, Decimal::from(7_600));
        assert_eq!(result.trace.steps.len(), 3);
        assert_eq!(price_configuration(van, &[]), Decimal::from(72_000));
    }

    #[test]
    fn money_is_grouped_by_thousands() {
        assert_eq!(format_money(Decimal::from(109_000)), "$109,000");
        assert_eq!(format_money(Decimal::from(1_234_567)), "$1,234,567");
        assert_eq!(format_money(Decimal::from(950)), "$950");
        assert_eq!(format_money(Decimal::ZERO), "$0");
        assert_eq!(format_money(Decimal::from(-8_000)), "-$8,000");
    }
}
