//! Volatility cubes: per-underlying-tenor surfaces of per-expiry skews.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::period::Period;

/// Quoting unit for volatilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolUnit {
    /// Normal vol in basis points per year.
    BpPerYear,
}

/// A skew: (strike offset, vol) pairs for one (tenor, expiry) cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilitySkew {
    /// (strike offset from ATM, vol) pairs.
    pub skew: Vec<(f64, f64)>,
}

/// One underlying tenor's surface: expiry → skew.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilitySurface {
    /// Expiry keyed skews.
    pub surface: BTreeMap<Period, VolatilitySkew>,
}

/// A full cube: underlying tenor → surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityCube {
    /// Quoting unit of every skew in the cube.
    pub unit: VolUnit,
    /// Underlying-tenor keyed surfaces.
    pub cube: BTreeMap<Period, VolatilitySurface>,
}

impl VolatilityCube {
    /// All (tenor, expiry) cells of the cube, in key order.
    pub fn cells(&self) -> Vec<(Period, Period)> {
        self.cube
            .iter()
            .flat_map(|(tenor, surface)| surface.surface.keys().map(|expiry| (*tenor, *expiry)))
            .collect()
    }

    /// The first (tenor, expiry) cell, if the cube is non-empty.
    pub fn first_cell(&self) -> Option<(Period, Period)> {
        let (tenor, surface) = self.cube.iter().next()?;
        let expiry = surface.surface.keys().next()?;
        Some((*tenor, *expiry))
    }
}

/// On-disk shape of a loadable cube file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubeFile {
    /// Currency the cube belongs to.
    pub currency: String,
    /// The cube itself.
    pub data: VolatilityCube,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::period::Unit;

    pub(crate) fn sample_cube() -> VolatilityCube {
        let skew = VolatilitySkew {
            skew: vec![(-0.01, 60.0), (0.0, 55.0), (0.01, 58.0)],
        };
        let mut surface = BTreeMap::new();
        let _ = surface.insert(Period::new(1, Unit::Year), skew.clone());
        let _ = surface.insert(Period::new(5, Unit::Year), skew.clone());
        let mut cube = BTreeMap::new();
        let _ = cube.insert(
            Period::new(6, Unit::Month),
            VolatilitySurface {
                surface: surface.clone(),
            },
        );
        let _ = cube.insert(Period::new(10, Unit::Year), VolatilitySurface { surface });
        VolatilityCube {
            unit: VolUnit::BpPerYear,
            cube,
        }
    }

    #[test]
    fn cells_enumerates_every_pair() {
        let cube = sample_cube();
        let cells = cube.cells();
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&(Period::new(6, Unit::Month), Period::new(1, Unit::Year))));
        assert!(cells.contains(&(Period::new(10, Unit::Year), Period::new(5, Unit::Year))));
    }

    #[test]
    fn first_cell_uses_key_order() {
        let cube = sample_cube();
        assert_eq!(
            cube.first_cell(),
            Some((Period::new(6, Unit::Month), Period::new(1, Unit::Year)))
        );
    }

    #[test]
    fn first_cell_empty_cube() {
        let cube = VolatilityCube {
            unit: VolUnit::BpPerYear,
            cube: BTreeMap::new(),
        };
        assert!(cube.first_cell().is_none());
    }

    #[test]
    fn cube_file_round_trip() {
        let file = CubeFile {
            currency: "EUR".into(),
            data: sample_cube(),
        };
        let js = serde_json::to_string(&file).unwrap();
        let back: CubeFile = serde_json::from_str(&js).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn cube_keys_serialize_as_period_strings() {
        let js = serde_json::to_value(sample_cube()).unwrap();
        assert!(js["cube"].get("6M").is_some());
        assert!(js["cube"]["6M"]["surface"].get("1Y").is_some());
    }
}
