//! Feature-set catalogs for the raw and extended form variants.
//!
//! The order of specs in each catalog is the order the scaler and regressor
//! were fitted on. The builder is the only place that turns named inputs into
//! positions, and it does so through these catalogs.

use crate::errors::PriceResult;
use crate::feature_spec::FeatureSpec;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MED_INC: &str = "MedInc";
pub const HOUSE_AGE: &str = "HouseAge";
pub const AVE_ROOMS: &str = "AveRooms";
pub const AVE_BEDRMS: &str = "AveBedrms";
pub const POPULATION: &str = "Population";
pub const AVE_OCCUP: &str = "AveOccup";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const ROOMS_PER_PERSON: &str = "RoomsPerPerson";
pub const BEDS_PER_ROOM: &str = "BedsPerRoom";
pub const POPULATION_PER_HOUSE: &str = "PopulationPerHouse";

fn raw_catalog() -> PriceResult<Vec<FeatureSpec>> {
    Ok(vec![
        FeatureSpec::float(MED_INC, "Median Income", 0.0, 20.0, 5.0)?,
        FeatureSpec::integer(HOUSE_AGE, "House Age", 1, 60, 20)?,
        FeatureSpec::float(AVE_ROOMS, "Average Rooms", 0.5, 15.0, 6.0)?,
        FeatureSpec::float(AVE_BEDRMS, "Average Bedrooms", 0.5, 5.0, 1.0)?,
        FeatureSpec::integer(POPULATION, "Population", 1, 50000, 1200)?,
        FeatureSpec::float(AVE_OCCUP, "Average Occupancy", 0.5, 10.0, 3.5)?,
        FeatureSpec::float(LATITUDE, "Latitude", 32.0, 42.0, 34.19)?,
        FeatureSpec::float(LONGITUDE, "Longitude", -125.0, -114.0, -118.45)?,
    ])
}

fn ratio_catalog() -> PriceResult<Vec<FeatureSpec>> {
    Ok(vec![
        FeatureSpec::float(ROOMS_PER_PERSON, "Rooms per Person", 0.05, 30.0, 1.7143)?,
        FeatureSpec::float(BEDS_PER_ROOM, "Bedrooms per Room", 0.03, 10.0, 0.1667)?,
        FeatureSpec::float(POPULATION_PER_HOUSE, "Population per House", 0.5, 10.0, 3.5)?,
    ])
}

lazy_static! {
    static ref RAW_SPECS: Vec<FeatureSpec> =
        raw_catalog().expect("built-in raw feature catalog is valid");
    static ref RATIO_SPECS: Vec<FeatureSpec> =
        ratio_catalog().expect("built-in ratio feature catalog is valid");
}

/// Which fitted feature layout a pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSetVariant {
    /// The eight raw census block-group features
    #[default]
    Raw,
    /// The raw features followed by three ratio features
    Extended,
}

impl fmt::Display for FeatureSetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureSetVariant::Raw => write!(f, "raw"),
            FeatureSetVariant::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for FeatureSetVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" | "8" => Ok(FeatureSetVariant::Raw),
            "extended" | "11" => Ok(FeatureSetVariant::Extended),
            other => Err(format!("unknown feature set variant '{other}'")),
        }
    }
}

/// Source of the three ratio features in the extended variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioMode {
    /// Ratios are independent user inputs, checked against their own bounds
    #[default]
    AcceptAsInput,
    /// Ratios are computed from the raw fields; user-supplied ratios are ignored
    DeriveFromRaw,
}

impl FromStr for RatioMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "accept_as_input" | "input" => Ok(RatioMode::AcceptAsInput),
            "derive_from_raw" | "derive" => Ok(RatioMode::DeriveFromRaw),
            other => Err(format!("unknown ratio mode '{other}'")),
        }
    }
}

/// A ratio feature and how to compute it from the raw block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedRatio {
    RoomsPerPerson,
    BedsPerRoom,
    PopulationPerHouse,
}

impl DerivedRatio {
    pub const ALL: [DerivedRatio; 3] = [
        DerivedRatio::RoomsPerPerson,
        DerivedRatio::BedsPerRoom,
        DerivedRatio::PopulationPerHouse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DerivedRatio::RoomsPerPerson => ROOMS_PER_PERSON,
            DerivedRatio::BedsPerRoom => BEDS_PER_ROOM,
            DerivedRatio::PopulationPerHouse => POPULATION_PER_HOUSE,
        }
    }

    /// Compute from the raw block laid out in raw-catalog order.
    /// Raw minimums are positive, so the divisors are never zero.
    pub fn derive(&self, raw: &[f64]) -> f64 {
        let at = |name: &str| {
            RAW_SPECS
                .iter()
                .position(|s| s.name == name)
                .and_then(|i| raw.get(i).copied())
                .unwrap_or(f64::NAN)
        };
        match self {
            DerivedRatio::RoomsPerPerson => at(AVE_ROOMS) / at(AVE_OCCUP),
            DerivedRatio::BedsPerRoom => at(AVE_BEDRMS) / at(AVE_ROOMS),
            // Population per household is the block group's average occupancy
            DerivedRatio::PopulationPerHouse => at(AVE_OCCUP),
        }
    }
}

/// Ordered feature declarations for one variant
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    variant: FeatureSetVariant,
    specs: Vec<FeatureSpec>,
}

impl FeatureSet {
    pub fn for_variant(variant: FeatureSetVariant) -> Self {
        let mut specs = RAW_SPECS.clone();
        if variant == FeatureSetVariant::Extended {
            specs.extend(RATIO_SPECS.iter().cloned());
        }
        Self { variant, specs }
    }

    pub fn raw() -> Self {
        Self::for_variant(FeatureSetVariant::Raw)
    }

    pub fn extended() -> Self {
        Self::for_variant(FeatureSetVariant::Extended)
    }

    pub fn variant(&self) -> FeatureSetVariant {
        self.variant
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Number of leading fields that are raw inputs
    pub fn raw_len(&self) -> usize {
        RAW_SPECS.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    pub fn spec(&self, name: &str) -> Option<&FeatureSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Ratio fields present in this set, with their positions
    pub fn ratios(&self) -> Vec<(usize, DerivedRatio)> {
        DerivedRatio::ALL
            .iter()
            .filter_map(|r| self.position(r.name()).map(|i| (i, *r)))
            .collect()
    }

    pub fn is_ratio(&self, name: &str) -> bool {
        DerivedRatio::ALL.iter().any(|r| r.name() == name) && self.position(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_spec::NumericKind;

    #[test]
    fn catalog_declarations_are_valid() {
        assert_eq!(raw_catalog().unwrap().len(), 8);
        assert_eq!(ratio_catalog().unwrap().len(), 3);
        for spec in FeatureSet::extended().specs() {
            spec.validate().unwrap();
        }
    }

    #[test]
    fn integer_fields_are_declared_as_integers() {
        let set = FeatureSet::raw();
        assert_eq!(set.spec(HOUSE_AGE).unwrap().kind, NumericKind::Integer);
        assert_eq!(set.spec(POPULATION).unwrap().kind, NumericKind::Integer);
        assert_eq!(set.spec(MED_INC).unwrap().kind, NumericKind::Float);
    }

    #[test]
    fn raw_variant_has_fitted_order() {
        let set = FeatureSet::raw();
        assert_eq!(
            set.names(),
            vec![
                "MedInc",
                "HouseAge",
                "AveRooms",
                "AveBedrms",
                "Population",
                "AveOccup",
                "Latitude",
                "Longitude"
            ]
        );
        assert!(set.ratios().is_empty());
    }

    #[test]
    fn extended_variant_appends_ratios() {
        let set = FeatureSet::extended();
        assert_eq!(set.len(), 11);
        assert_eq!(set.position(ROOMS_PER_PERSON), Some(8));
        assert_eq!(set.position(POPULATION_PER_HOUSE), Some(10));
        assert!(set.is_ratio(BEDS_PER_ROOM));
        assert!(!FeatureSet::raw().is_ratio(BEDS_PER_ROOM));
    }

    #[test]
    fn ratio_derivation_from_defaults() {
        let raw: Vec<f64> = FeatureSet::raw().specs().iter().map(|s| s.default).collect();
        assert!((DerivedRatio::RoomsPerPerson.derive(&raw) - 6.0 / 3.5).abs() < 1e-12);
        assert!((DerivedRatio::BedsPerRoom.derive(&raw) - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(DerivedRatio::PopulationPerHouse.derive(&raw), 3.5);
    }

    #[test]
    fn variant_parses_from_config_strings() {
        assert_eq!("Extended".parse::<FeatureSetVariant>(), Ok(FeatureSetVariant::Extended));
        assert_eq!("8".parse::<FeatureSetVariant>(), Ok(FeatureSetVariant::Raw));
        assert!("nine".parse::<FeatureSetVariant>().is_err());
        assert_eq!("derive-from-raw".parse::<RatioMode>(), Ok(RatioMode::DeriveFromRaw));
    }
}
