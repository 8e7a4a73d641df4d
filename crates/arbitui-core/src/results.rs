//! Engine result payloads: arbitrage findings and sampled vol surfaces.

use serde::{Deserialize, Serialize};

use crate::period::Period;

/// A detected arbitrage, tagged by where it shows up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Arbitrage {
    /// Call prices violate the left (low-strike) asymptotic bound.
    LeftAsymptotic,
    /// Call prices violate the right (high-strike) asymptotic bound.
    RightAsymptotic,
    /// Negative implied density between two strikes.
    Density {
        /// Strike interval with negative density.
        between: (f64, f64),
    },
}

/// Result of checking one (tenor, expiry) cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageCheck {
    /// `None` means the cell is arbitrage-free.
    pub arbitrage: Option<Arbitrage>,
}

/// Result of a bulk full-cube check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageMatrix {
    /// (tenor, expiry, finding) triples for every cell of the cube.
    pub matrix: Vec<(Period, Period, Option<Arbitrage>)>,
}

/// Sampled implied vol and density for one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolSampling {
    /// Strikes at the quoted skew points.
    pub quoted_strikes: Vec<f64>,
    /// Vols at the quoted skew points.
    pub quoted_vols: Vec<f64>,
    /// Implied density at the quoted skew points.
    pub quoted_pdf: Vec<f64>,
    /// Dense strike grid.
    pub strikes: Vec<f64>,
    /// Interpolated vols on the dense grid.
    pub vols: Vec<f64>,
    /// Implied density on the dense grid.
    pub pdf: Vec<f64>,
    /// Forward level of the underlying rate.
    pub fwd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arbitrage_variants_tagged() {
        let js = serde_json::to_value(Arbitrage::LeftAsymptotic).unwrap();
        assert_eq!(js["type"], "LeftAsymptotic");

        let d = Arbitrage::Density {
            between: (0.01, 0.02),
        };
        let js = serde_json::to_value(&d).unwrap();
        assert_eq!(js["type"], "Density");
        let back: Arbitrage = serde_json::from_value(js).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn clean_check_is_null() {
        let check = ArbitrageCheck { arbitrage: None };
        let js = serde_json::to_string(&check).unwrap();
        assert_eq!(js, r#"{"arbitrage":null}"#);
        let back: ArbitrageCheck = serde_json::from_str(&js).unwrap();
        assert!(back.arbitrage.is_none());
    }

    #[test]
    fn matrix_round_trip() {
        let m = ArbitrageMatrix {
            matrix: vec![
                ("6M".parse().unwrap(), "1Y".parse().unwrap(), None),
                (
                    "6M".parse().unwrap(),
                    "5Y".parse().unwrap(),
                    Some(Arbitrage::RightAsymptotic),
                ),
            ],
        };
        let js = serde_json::to_string(&m).unwrap();
        let back: ArbitrageMatrix = serde_json::from_str(&js).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn vol_sampling_camel_case() {
        let s = VolSampling {
            quoted_strikes: vec![0.01],
            quoted_vols: vec![55.0],
            quoted_pdf: vec![0.2],
            strikes: vec![0.01, 0.02],
            vols: vec![55.0, 56.0],
            pdf: vec![0.2, 0.1],
            fwd: 0.015,
        };
        let js = serde_json::to_value(&s).unwrap();
        assert!(js.get("quotedStrikes").is_some());
        assert!(js.get("quoted_strikes").is_none());
        assert_eq!(js["fwd"], 0.015);
    }
}
