//! Unit registry built from the job's `units` mapping.
//!
//! Conversion strategies are multipliers into the model's native unit:
//! `mx` means `native = value * m`. The registry is seeded with intrinsic
//! units the payload may reference without declaring; job-defined units
//! replace intrinsic entries of the same id.

use std::collections::{BTreeMap, HashMap};

use crate::error::ValidationError;
use crate::schema::{ConversionStrategyDef, CustomZonesDef, UnitDef};

/// Multiply-by-`m` conversion strategy tag.
pub const STRATEGY_MULTIPLY: &str = "mx";

/// Units always resolvable: (id, label) with identity conversion.
pub const INTRINSIC_UNITS: &[(&str, &str)] = &[("m2", "square meters")];

#[derive(Debug, Clone, PartialEq)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDef>,
}

impl UnitRegistry {
    pub fn from_defs(defs: &BTreeMap<String, UnitDef>) -> Self {
        let mut units: HashMap<String, UnitDef> = INTRINSIC_UNITS
            .iter()
            .map(|(id, label)| ((*id).to_string(), intrinsic_unit(id, label)))
            .collect();
        for (key, def) in defs {
            units.insert(key.clone(), def.clone());
        }
        Self { units }
    }

    pub fn contains(&self, unit_id: &str) -> bool {
        self.units.contains_key(unit_id)
    }

    pub fn resolve(&self, unit_id: &str) -> Result<&UnitDef, ValidationError> {
        self.units
            .get(unit_id)
            .ok_or_else(|| ValidationError::UnknownUnit {
                unit_id: unit_id.to_string(),
                context: "unit registry".to_string(),
            })
    }

    /// Multiplier applied by the unit's conversion strategy.
    pub fn factor(&self, unit_id: &str) -> Result<f64, ValidationError> {
        let unit = self.resolve(unit_id)?;
        strategy_factor(unit_id, &unit.conversion_strategy)
    }

    /// Convert `value` expressed in `unit_id` into the model's native unit.
    pub fn convert(&self, value: f64, unit_id: &str) -> Result<f64, ValidationError> {
        Ok(value * self.factor(unit_id)?)
    }

    /// Display zones of a unit, if it declares any.
    pub fn zones(&self, unit_id: &str) -> Result<Option<&CustomZonesDef>, ValidationError> {
        Ok(self.resolve(unit_id)?.custom_zones.as_ref())
    }

    /// Check every job-defined unit: key consistency, conversion strategy,
    /// and strictly ascending zone edges.
    pub fn check(defs: &BTreeMap<String, UnitDef>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (key, def) in defs {
            if def.unit_id != *key {
                errors.push(ValidationError::KeyMismatch {
                    key: key.clone(),
                    id: def.unit_id.clone(),
                    context: "units".to_string(),
                });
            }
            if let Err(err) = strategy_factor(key, &def.conversion_strategy) {
                errors.push(err);
            }
            if let Some(zones) = &def.custom_zones {
                errors.extend(check_zone_ordering(key, zones));
            }
        }
        errors
    }
}

fn intrinsic_unit(id: &str, label: &str) -> UnitDef {
    UnitDef {
        unit_id: id.to_string(),
        label: label.to_string(),
        description: None,
        conversion_strategy: ConversionStrategyDef {
            kind: STRATEGY_MULTIPLY.to_string(),
            m: Some(1.0),
        },
        custom_zones: None,
    }
}

fn strategy_factor(unit_id: &str, strategy: &ConversionStrategyDef) -> Result<f64, ValidationError> {
    if strategy.kind != STRATEGY_MULTIPLY {
        return Err(ValidationError::UnsupportedConversion {
            unit_id: unit_id.to_string(),
            strategy: strategy.kind.clone(),
        });
    }
    match strategy.m {
        Some(m) if m.is_finite() => Ok(m),
        Some(m) => Err(ValidationError::invalid(
            format!("units.{}.conversion_strategy.m", unit_id),
            m,
            "must be finite",
        )),
        None => Err(ValidationError::invalid(
            format!("units.{}.conversion_strategy.m", unit_id),
            "<absent>",
            "required for 'mx' conversion",
        )),
    }
}

/// Zone `upper` edges must rise strictly; one error per offending zone.
pub fn check_zone_ordering(unit_id: &str, zones: &CustomZonesDef) -> Vec<ValidationError> {
    zones
        .next
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[1].upper.partial_cmp(&w[0].upper) != Some(core::cmp::Ordering::Greater))
        .map(|(i, w)| ValidationError::InvalidZoneOrdering {
            unit_id: unit_id.to_string(),
            index: i + 1,
            previous: w[0].upper,
            upper: w[1].upper,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ZoneDef;

    fn unit(id: &str, kind: &str, m: Option<f64>, uppers: &[f64]) -> UnitDef {
        UnitDef {
            unit_id: id.to_string(),
            label: "g/m3".to_string(),
            description: None,
            conversion_strategy: ConversionStrategyDef {
                kind: kind.to_string(),
                m,
            },
            custom_zones: Some(CustomZonesDef {
                lower: 0.0,
                next: uppers
                    .iter()
                    .map(|u| ZoneDef {
                        upper: *u,
                        color: "#6ecc58".to_string(),
                        inverted_color: Some("#000000".to_string()),
                    })
                    .collect(),
            }),
        }
    }

    fn defs(units: Vec<UnitDef>) -> BTreeMap<String, UnitDef> {
        units.into_iter().map(|u| (u.unit_id.clone(), u)).collect()
    }

    #[test]
    fn convert_applies_multiplier() {
        let reg = UnitRegistry::from_defs(&defs(vec![unit("u1", "mx", Some(0.5), &[1.0])]));
        assert_eq!(reg.convert(10.0, "u1").unwrap(), 5.0);
    }

    #[test]
    fn unknown_unit_fails() {
        let reg = UnitRegistry::from_defs(&BTreeMap::new());
        assert!(matches!(
            reg.resolve("u9"),
            Err(ValidationError::UnknownUnit { unit_id, .. }) if unit_id == "u9"
        ));
        assert!(reg.convert(1.0, "u9").is_err());
    }

    #[test]
    fn intrinsic_area_unit_resolves() {
        let reg = UnitRegistry::from_defs(&BTreeMap::new());
        assert!(reg.contains("m2"));
        assert_eq!(reg.convert(100.0, "m2").unwrap(), 100.0);
    }

    #[test]
    fn unsupported_strategy_fails_conversion() {
        let reg = UnitRegistry::from_defs(&defs(vec![unit("u1", "log", Some(1.0), &[])]));
        assert_eq!(
            reg.convert(1.0, "u1"),
            Err(ValidationError::UnsupportedConversion {
                unit_id: "u1".to_string(),
                strategy: "log".to_string(),
            })
        );
    }

    #[test]
    fn ascending_zones_validate() {
        let d = defs(vec![unit("u1", "mx", Some(1.0), &[1.0, 2.0])]);
        assert!(UnitRegistry::check(&d).is_empty());
    }

    #[test]
    fn descending_zones_fail() {
        let d = defs(vec![unit("u1", "mx", Some(1.0), &[2.0, 1.0])]);
        assert_eq!(
            UnitRegistry::check(&d),
            vec![ValidationError::InvalidZoneOrdering {
                unit_id: "u1".to_string(),
                index: 1,
                previous: 2.0,
                upper: 1.0,
            }]
        );
    }

    #[test]
    fn equal_zone_edges_fail() {
        let d = defs(vec![unit("u1", "mx", Some(1.0), &[1.0, 1.0])]);
        assert_eq!(UnitRegistry::check(&d).len(), 1);
    }

    #[test]
    fn key_mismatch_and_missing_multiplier_reported() {
        let mut d = BTreeMap::new();
        d.insert("u2".to_string(), unit("u1", "mx", None, &[]));
        let errors = UnitRegistry::check(&d);
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::KeyMismatch { .. }));
        assert!(matches!(errors[1], ValidationError::InvalidValue { .. }));
    }
}
