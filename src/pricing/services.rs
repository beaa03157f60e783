//! Catalog-backed pricing: resolve a selection against the catalog and price it.
//!
//! Unknown references are handled according to a [`ResolutionMode`]. The
//! default, `Lenient`, lets unknown services, add-ons and choices contribute
//! nothing so a non-binding estimate is always produced. `Strict` reports them.

use serde::Deserialize;

use super::calculators::{option_contribution, AddOnLine, AddOnTotals, Estimate, ServiceLine};
use super::catalog::{Catalog, OptionKind, OptionMap, OptionSpec, OptionValue};

/// How unknown or malformed references are treated while pricing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Unknown keys contribute 0, option values pass through unchecked
    #[default]
    Lenient,
    /// Unknown keys and invalid option values are errors
    Strict,
}

/// Pricing error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("Unknown service '{service_key}'")]
    UnknownService { service_key: String },

    #[error("Unknown add-on '{add_on_id}'")]
    UnknownAddOn { add_on_id: String },

    #[error("Unknown choice '{value}' for {service_key}.{option_id}")]
    UnknownChoice {
        service_key: String,
        option_id: String,
        value: String,
    },

    #[error("{service_key}.{option_id} expects a {expected} value, got {actual}")]
    InvalidOptionValue {
        service_key: String,
        option_id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{service_key}.{option_id} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        service_key: String,
        option_id: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid catalog: {message}")]
    InvalidCatalog { message: String, errors: Vec<String> },

    #[error("Failed to load catalog from {path}: {message}")]
    CatalogLoad { path: String, message: String },
}

/// Prices selections against a catalog
#[derive(Debug, Clone, Copy)]
pub struct Pricer<'a> {
    catalog: &'a Catalog,
    mode: ResolutionMode,
}

impl<'a> Pricer<'a> {
    pub fn new(catalog: &'a Catalog, mode: ResolutionMode) -> Self {
        Self { catalog, mode }
    }

    pub fn lenient(catalog: &'a Catalog) -> Self {
        Self::new(catalog, ResolutionMode::Lenient)
    }

    pub fn strict(catalog: &'a Catalog) -> Self {
        Self::new(catalog, ResolutionMode::Strict)
    }

    /// Price one service with the given option values.
    ///
    /// Options missing from `options` fall back to their catalog default;
    /// entries in `options` that the catalog does not define are ignored.
    pub fn service_price(&self, service_key: &str, options: &OptionMap) -> Result<i64, PricingError> {
        let Some(entry) = self.catalog.service(service_key) else {
            return match self.mode {
                ResolutionMode::Lenient => Ok(0),
                ResolutionMode::Strict => Err(PricingError::UnknownService {
                    service_key: service_key.to_string(),
                }),
            };
        };

        let mut total = entry.base_price_krw;
        for opt in &entry.options {
            let default_value;
            let value = match options.get(&opt.id) {
                Some(v) => v,
                None => {
                    default_value = opt.default_value();
                    &default_value
                }
            };
            if self.mode == ResolutionMode::Strict {
                check_option(service_key, opt, value)?;
            }
            total = total.saturating_add(option_contribution(&opt.id, &opt.kind, value));
        }

        Ok(total)
    }

    /// Split the selected add-ons into daily and fixed totals
    pub fn add_on_totals<'i, I>(&self, add_on_ids: I) -> Result<AddOnTotals, PricingError>
    where
        I: IntoIterator<Item = &'i str>,
    {
        let mut totals = AddOnTotals::default();
        for id in add_on_ids {
            match self.catalog.add_on(id) {
                Some(add_on) => totals.push(AddOnLine {
                    id: add_on.id.clone(),
                    price_krw: add_on.price_krw,
                    per_day: add_on.per_day,
                }),
                None if self.mode == ResolutionMode::Strict => {
                    return Err(PricingError::UnknownAddOn {
                        add_on_id: id.to_string(),
                    });
                }
                None => {}
            }
        }
        Ok(totals)
    }

    /// Price a whole selection for an event of `duration_days`
    pub fn estimate<'s, S, A>(
        &self,
        services: S,
        add_on_ids: A,
        duration_days: i64,
    ) -> Result<Estimate, PricingError>
    where
        S: IntoIterator<Item = (&'s str, &'s OptionMap)>,
        A: IntoIterator<Item = &'s str>,
    {
        let lines = services
            .into_iter()
            .map(|(service_key, options)| {
                self.service_price(service_key, options).map(|subtotal| ServiceLine {
                    service_key: service_key.to_string(),
                    subtotal,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let add_ons = self.add_on_totals(add_on_ids)?;

        Ok(Estimate::from_lines(lines, add_ons, duration_days))
    }
}

/// Price a service against the built-in catalog, skipping unknown keys.
///
/// # Examples
/// ```
/// use quote_engine_web::pricing::{compute_service_price, OptionMap};
///
/// assert_eq!(compute_service_price("acscent", &OptionMap::new()), 3_000_000);
/// assert_eq!(compute_service_price("nonexistent-key", &OptionMap::new()), 0);
/// ```
pub fn compute_service_price(service_key: &str, options: &OptionMap) -> i64 {
    Pricer::lenient(Catalog::builtin())
        .service_price(service_key, options)
        .unwrap_or(0)
}

fn check_option(service_key: &str, opt: &OptionSpec, value: &OptionValue) -> Result<(), PricingError> {
    let mismatch = |expected: &'static str| PricingError::InvalidOptionValue {
        service_key: service_key.to_string(),
        option_id: opt.id.clone(),
        expected,
        actual: value.kind_name(),
    };

    match (&opt.kind, value) {
        (OptionKind::Toggle { .. }, OptionValue::Toggle(_)) => Ok(()),
        (OptionKind::Select { price_modifier, .. }, OptionValue::Choice(choice)) => {
            if price_modifier.contains_key(choice) {
                Ok(())
            } else {
                Err(PricingError::UnknownChoice {
                    service_key: service_key.to_string(),
                    option_id: opt.id.clone(),
                    value: choice.clone(),
                })
            }
        }
        (OptionKind::Number { min, max, .. }, OptionValue::Number(n)) => {
            if (*min..=*max).contains(n) {
                Ok(())
            } else {
                Err(PricingError::OutOfRange {
                    service_key: service_key.to_string(),
                    option_id: opt.id.clone(),
                    value: *n,
                    min: *min,
                    max: *max,
                })
            }
        }
        (OptionKind::Toggle { .. }, _) => Err(mismatch("toggle")),
        (OptionKind::Select { .. }, _) => Err(mismatch("select")),
        (OptionKind::Number { .. }, _) => Err(mismatch("number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn options(pairs: &[(&str, OptionValue)]) -> OptionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn contribution_of_default(opt: &OptionSpec) -> i64 {
        option_contribution(&opt.id, &opt.kind, &opt.default_value())
    }

    // ==================== service_price tests ====================

    #[test]
    fn test_defaults_price_equals_base_plus_default_contributions() {
        let catalog = Catalog::builtin();
        for entry in &catalog.services {
            let expected = entry.base_price_krw
                + entry.options.iter().map(contribution_of_default).sum::<i64>();
            assert_eq!(
                compute_service_price(&entry.id, &entry.default_options()),
                expected,
                "{}",
                entry.id
            );
            // Empty options fall back to the same defaults
            assert_eq!(compute_service_price(&entry.id, &OptionMap::new()), expected);
        }
    }

    #[test]
    fn test_unknown_service_is_zero() {
        assert_eq!(compute_service_price("nonexistent-key", &OptionMap::new()), 0);
    }

    #[test]
    fn test_toggle_round_trip() {
        let base = compute_service_price("acscent", &OptionMap::new());
        let on = compute_service_price("acscent", &options(&[("customBottle", true.into())]));
        let off = compute_service_price("acscent", &options(&[("customBottle", false.into())]));
        assert_eq!(on - base, 1_000_000);
        assert_eq!(off, base);
    }

    #[test]
    fn test_select_choice_adds_its_delta() {
        let price = compute_service_price("mediaArt", &options(&[("screenSize", "large".into())]));
        assert_eq!(price, 5_000_000 + 6_000_000);
    }

    #[test]
    fn test_unknown_select_choice_contributes_zero() {
        let price = compute_service_price("mediaArt", &options(&[("screenSize", "giant".into())]));
        assert_eq!(price, 5_000_000);
    }

    #[test]
    fn test_booth_count_first_unit_free() {
        let at = |n: i64| {
            compute_service_price("acscent", &options(&[("boothCount", OptionValue::Number(n))]))
        };
        assert_eq!(at(1), at(0));
        assert_eq!(at(1), 3_000_000);
        assert_eq!(at(2) - at(1), 1_500_000);
        assert_eq!(at(4) - at(3), 1_500_000);
    }

    #[test]
    fn test_kiosk_count_first_unit_free() {
        let at = |n: i64| {
            compute_service_price("photoBooth", &options(&[("kioskCount", OptionValue::Number(n))]))
        };
        assert_eq!(at(1), 2_000_000);
        assert_eq!(at(3), 2_000_000 + 2 * 900_000);
    }

    #[test]
    fn test_regular_count_bills_every_unit() {
        let price = compute_service_price(
            "rental",
            &options(&[("equipmentCount", OptionValue::Number(3))]),
        );
        assert_eq!(price, 1_000_000 + 3 * 200_000);
    }

    #[test]
    fn test_unlisted_option_keys_ignored() {
        let price = compute_service_price("custom", &options(&[("whatever", true.into())]));
        assert_eq!(price, 0);
    }

    // ==================== strict mode tests ====================

    #[test]
    fn test_strict_unknown_service() {
        let err = Pricer::strict(Catalog::builtin())
            .service_price("nope", &OptionMap::new())
            .unwrap_err();
        assert_eq!(
            err,
            PricingError::UnknownService {
                service_key: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_strict_out_of_range() {
        let err = Pricer::strict(Catalog::builtin())
            .service_price("acscent", &options(&[("boothCount", OptionValue::Number(9))]))
            .unwrap_err();
        assert!(matches!(err, PricingError::OutOfRange { value: 9, min: 1, max: 5, .. }));
    }

    #[test]
    fn test_strict_unknown_choice_and_mismatch() {
        let pricer = Pricer::strict(Catalog::builtin());
        let err = pricer
            .service_price("mediaArt", &options(&[("screenSize", "giant".into())]))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownChoice { .. }));

        let err = pricer
            .service_price("mediaArt", &options(&[("interactive", "yes".into())]))
            .unwrap_err();
        assert!(err.to_string().contains("expects a toggle value, got select"));
    }

    #[test]
    fn test_strict_accepts_valid_selection() {
        let price = Pricer::strict(Catalog::builtin())
            .service_price(
                "acscent",
                &options(&[
                    ("boothCount", OptionValue::Number(2)),
                    ("scentRange", "premium".into()),
                    ("onsitePerfumer", true.into()),
                ]),
            )
            .unwrap();
        assert_eq!(price, 3_000_000 + 1_500_000 + 800_000 + 600_000);
    }

    #[test]
    fn test_lenient_out_of_range_passes_through() {
        let price = compute_service_price(
            "acscent",
            &options(&[("boothCount", OptionValue::Number(9))]),
        );
        assert_eq!(price, 3_000_000 + 8 * 1_500_000);
    }

    // ==================== add-on / estimate tests ====================

    #[test]
    fn test_add_on_totals_skip_unknown() {
        let totals = Pricer::lenient(Catalog::builtin())
            .add_on_totals(["staffing", "transport", "mystery"])
            .unwrap();
        assert_eq!(totals.daily, 800_000);
        assert_eq!(totals.fixed, 500_000);
        assert_eq!(totals.lines.len(), 2);
    }

    #[test]
    fn test_add_on_totals_strict_unknown() {
        let err = Pricer::strict(Catalog::builtin())
            .add_on_totals(["mystery"])
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownAddOn { .. }));
    }

    #[test]
    fn test_estimate_three_day_single_service() {
        let defaults = OptionMap::new();
        let estimate = Pricer::lenient(Catalog::builtin())
            .estimate([("acscent", &defaults)], [], 3)
            .unwrap();
        assert_eq!(estimate.subtotal, 3_000_000);
        assert_eq!(estimate.duration_multiplier, dec!(1.6));
        assert_eq!(estimate.total, 4_800_000);
    }

    #[test]
    fn test_estimate_daily_and_fixed_add_ons() {
        let defaults = OptionMap::new();
        let estimate = Pricer::lenient(Catalog::builtin())
            .estimate([("photoBooth", &defaults)], ["staffing", "transport"], 1)
            .unwrap();
        assert_eq!(estimate.subtotal, 2_000_000);
        assert_eq!(estimate.add_ons_total, 1_300_000);
        assert_eq!(estimate.duration_multiplier, Decimal::ONE);
        assert_eq!(estimate.total, 3_300_000);
    }

    #[test]
    fn test_estimate_unknown_service_line_is_zero() {
        let defaults = OptionMap::new();
        let estimate = Pricer::lenient(Catalog::builtin())
            .estimate([("ghost", &defaults), ("custom", &defaults)], [], 2)
            .unwrap();
        assert_eq!(estimate.services.len(), 2);
        assert_eq!(estimate.services[0].subtotal, 0);
        assert_eq!(estimate.total, 0);
    }

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::UnknownAddOn {
            add_on_id: "abc".to_string(),
        };
        assert!(err.to_string().contains("abc"));

        let err = PricingError::InvalidCatalog {
            message: "2 catalog violation(s)".to_string(),
            errors: vec![],
        };
        assert!(err.to_string().contains("2 catalog violation"));
    }
}
