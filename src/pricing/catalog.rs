//! Static pricing catalog: services, their options, and add-ons.
//!
//! The catalog is plain reference data. Every price computation reads from it
//! and nothing mutates it after load. A built-in catalog ships with the binary;
//! a JSON file with the same shape can replace it at startup.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use super::services::PricingError;

/// Option id -> chosen value for one selected service.
pub type OptionMap = BTreeMap<String, OptionValue>;

/// A value chosen for a service option.
///
/// Serialized untagged so JSON payloads carry plain `true`, `3` or `"premium"`.
/// Numbers are whole: `2.0` is read as `2`, while `2.5` or a value outside
/// `i64` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Toggle(bool),
    Number(i64),
    Choice(String),
}

impl<'de> Deserialize<'de> for OptionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(OptionValueVisitor)
    }
}

struct OptionValueVisitor;

impl<'de> Visitor<'de> for OptionValueVisitor {
    type Value = OptionValue;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean, a whole number or a string")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<OptionValue, E> {
        Ok(OptionValue::Toggle(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<OptionValue, E> {
        Ok(OptionValue::Number(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<OptionValue, E> {
        i64::try_from(v)
            .map(OptionValue::Number)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<OptionValue, E> {
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(OptionValue::Number(v as i64))
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<OptionValue, E> {
        Ok(OptionValue::Choice(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<OptionValue, E> {
        Ok(OptionValue::Choice(v))
    }
}

impl OptionValue {
    /// Short name of the value's shape, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::Toggle(_) => "toggle",
            OptionValue::Number(_) => "number",
            OptionValue::Choice(_) => "select",
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Toggle(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Choice(value.to_string())
    }
}

/// How an option modifies the price, with its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OptionKind {
    /// Adds `price_modifier` when switched on
    #[serde(rename_all = "camelCase")]
    Toggle {
        price_modifier: i64,
        default_value: bool,
    },
    /// Adds the delta mapped to the chosen value
    #[serde(rename_all = "camelCase")]
    Select {
        choices: Vec<String>,
        price_modifier: BTreeMap<String, i64>,
        default_value: String,
    },
    /// Adds `price_modifier` per billable unit; valid input lies in `[min, max]`
    #[serde(rename_all = "camelCase")]
    Number {
        price_modifier: i64,
        min: i64,
        max: i64,
        default_value: i64,
    },
}

/// One configurable modifier on a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub id: String,
    #[serde(flatten)]
    pub kind: OptionKind,
}

impl OptionSpec {
    pub fn toggle(id: &str, price_modifier: i64) -> Self {
        Self {
            id: id.to_string(),
            kind: OptionKind::Toggle {
                price_modifier,
                default_value: false,
            },
        }
    }

    /// Select option defaulting to its first choice
    pub fn select(id: &str, choices: &[(&str, i64)]) -> Self {
        Self {
            id: id.to_string(),
            kind: OptionKind::Select {
                choices: choices.iter().map(|(v, _)| v.to_string()).collect(),
                price_modifier: choices.iter().map(|(v, p)| (v.to_string(), *p)).collect(),
                default_value: choices.first().map(|(v, _)| v.to_string()).unwrap_or_default(),
            },
        }
    }

    pub fn number(id: &str, price_modifier: i64, min: i64, max: i64, default_value: i64) -> Self {
        Self {
            id: id.to_string(),
            kind: OptionKind::Number {
                price_modifier,
                min,
                max,
                default_value,
            },
        }
    }

    /// Value applied when the owning service is first added to a quote
    pub fn default_value(&self) -> OptionValue {
        match &self.kind {
            OptionKind::Toggle { default_value, .. } => OptionValue::Toggle(*default_value),
            OptionKind::Select { default_value, .. } => OptionValue::Choice(default_value.clone()),
            OptionKind::Number { default_value, .. } => OptionValue::Number(*default_value),
        }
    }
}

/// A purchasable service line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCatalogEntry {
    pub id: String,
    #[serde(rename = "basePriceKRW")]
    pub base_price_krw: i64,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

impl ServiceCatalogEntry {
    /// Every option set to its default, as stored on a freshly added cart entry
    pub fn default_options(&self) -> OptionMap {
        self.options
            .iter()
            .map(|opt| (opt.id.clone(), opt.default_value()))
            .collect()
    }

    pub fn option(&self, option_id: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|opt| opt.id == option_id)
    }
}

/// An extra charge not tied to a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub id: String,
    #[serde(rename = "priceKRW")]
    pub price_krw: i64,
    /// Scales with event duration when true
    pub per_day: bool,
}

/// The full set of services and add-ons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub services: Vec<ServiceCatalogEntry>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
}

static BUILTIN: LazyLock<Catalog> = LazyLock::new(Catalog::default_catalog);

impl Catalog {
    /// Shared built-in catalog
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn service(&self, service_key: &str) -> Option<&ServiceCatalogEntry> {
        self.services.iter().find(|s| s.id == service_key)
    }

    pub fn add_on(&self, add_on_id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.id == add_on_id)
    }

    /// Load and validate a catalog from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let path = path.as_ref();
        let load_error = |message: String| PricingError::CatalogLoad {
            path: path.display().to_string(),
            message,
        };

        let bytes = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let catalog: Catalog =
            serde_json::from_slice(&bytes).map_err(|e| load_error(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the catalog's structural guarantees.
    ///
    /// Ids are unique, prices non-negative, every select choice has a price
    /// entry, and every default is valid for its option kind.
    pub fn validate(&self) -> Result<(), PricingError> {
        let mut errors = Vec::new();

        let mut service_ids = HashSet::new();
        for service in &self.services {
            if !service_ids.insert(service.id.as_str()) {
                errors.push(format!("duplicate service id '{}'", service.id));
            }
            if service.base_price_krw < 0 {
                errors.push(format!("service '{}' has a negative base price", service.id));
            }

            let mut option_ids = HashSet::new();
            for opt in &service.options {
                if !option_ids.insert(opt.id.as_str()) {
                    errors.push(format!("service '{}' repeats option '{}'", service.id, opt.id));
                }
                validate_option(&service.id, opt, &mut errors);
            }
        }

        let mut add_on_ids = HashSet::new();
        for add_on in &self.add_ons {
            if !add_on_ids.insert(add_on.id.as_str()) {
                errors.push(format!("duplicate add-on id '{}'", add_on.id));
            }
            if add_on.price_krw < 0 {
                errors.push(format!("add-on '{}' has a negative price", add_on.id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PricingError::InvalidCatalog {
                message: format!("{} catalog violation(s)", errors.len()),
                errors,
            })
        }
    }

    fn default_catalog() -> Self {
        Self {
            services: vec![
                ServiceCatalogEntry {
                    id: "acscent".to_string(),
                    base_price_krw: 3_000_000,
                    options: vec![
                        OptionSpec::number("boothCount", 1_500_000, 1, 5, 1),
                        OptionSpec::select(
                            "scentRange",
                            &[("standard", 0), ("premium", 800_000), ("signature", 2_000_000)],
                        ),
                        OptionSpec::toggle("customBottle", 1_000_000),
                        OptionSpec::toggle("onsitePerfumer", 600_000),
                    ],
                },
                ServiceCatalogEntry {
                    id: "photoBooth".to_string(),
                    base_price_krw: 2_000_000,
                    options: vec![
                        OptionSpec::number("kioskCount", 900_000, 1, 6, 1),
                        OptionSpec::select(
                            "printSize",
                            &[("4x6", 0), ("strip", 150_000), ("6x8", 300_000)],
                        ),
                        OptionSpec::toggle("customFrame", 400_000),
                        OptionSpec::toggle("digitalGallery", 250_000),
                    ],
                },
                ServiceCatalogEntry {
                    id: "mediaArt".to_string(),
                    base_price_krw: 5_000_000,
                    options: vec![
                        OptionSpec::select(
                            "screenSize",
                            &[("small", 0), ("medium", 2_500_000), ("large", 6_000_000)],
                        ),
                        OptionSpec::toggle("interactive", 3_000_000),
                        OptionSpec::number("contentCount", 700_000, 0, 10, 0),
                    ],
                },
                ServiceCatalogEntry {
                    id: "spatialDesign".to_string(),
                    base_price_krw: 8_000_000,
                    options: vec![
                        OptionSpec::select(
                            "scale",
                            &[("booth", 0), ("popup", 6_000_000), ("exhibition", 15_000_000)],
                        ),
                        OptionSpec::select("fabrication", &[("standard", 0), ("premium", 4_000_000)]),
                        OptionSpec::toggle("lighting", 1_500_000),
                    ],
                },
                ServiceCatalogEntry {
                    id: "rental".to_string(),
                    base_price_krw: 1_000_000,
                    options: vec![
                        OptionSpec::number("equipmentCount", 200_000, 1, 50, 1),
                        OptionSpec::toggle("delivery", 300_000),
                    ],
                },
                ServiceCatalogEntry {
                    id: "custom".to_string(),
                    base_price_krw: 0,
                    options: vec![],
                },
            ],
            add_ons: vec![
                AddOn {
                    id: "staffing".to_string(),
                    price_krw: 800_000,
                    per_day: true,
                },
                AddOn {
                    id: "technician".to_string(),
                    price_krw: 500_000,
                    per_day: true,
                },
                AddOn {
                    id: "transport".to_string(),
                    price_krw: 500_000,
                    per_day: false,
                },
                AddOn {
                    id: "setupTeardown".to_string(),
                    price_krw: 800_000,
                    per_day: false,
                },
                AddOn {
                    id: "videoRecap".to_string(),
                    price_krw: 1_500_000,
                    per_day: false,
                },
                AddOn {
                    id: "branding".to_string(),
                    price_krw: 700_000,
                    per_day: false,
                },
            ],
        }
    }
}

fn validate_option(service_id: &str, opt: &OptionSpec, errors: &mut Vec<String>) {
    match &opt.kind {
        OptionKind::Toggle { .. } => {}
        OptionKind::Select {
            choices,
            price_modifier,
            default_value,
        } => {
            for choice in choices {
                if !price_modifier.contains_key(choice) {
                    errors.push(format!(
                        "{}.{}: choice '{}' has no price modifier",
                        service_id, opt.id, choice
                    ));
                }
            }
            if !choices.contains(default_value) {
                errors.push(format!(
                    "{}.{}: default '{}' is not a listed choice",
                    service_id, opt.id, default_value
                ));
            }
        }
        OptionKind::Number {
            min,
            max,
            default_value,
            ..
        } => {
            if min > max {
                errors.push(format!("{}.{}: min {} exceeds max {}", service_id, opt.id, min, max));
            } else if default_value < min || default_value > max {
                errors.push(format!(
                    "{}.{}: default {} outside [{}, {}]",
                    service_id, opt.id, default_value, min, max
                ));
            }
        }
    }
}
