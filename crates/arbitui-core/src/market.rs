//! Assembly of the market/static payloads carried by every engine call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::rates::{Libor, Underlying, VolConventions, VolatilityMarketConventions};
use crate::vol::VolatilityCube;

/// A yield curve payload, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum YieldCurve {
    /// Explicit discount factors.
    Discounts {
        /// (date, discount factor) pillars.
        discounts: Vec<(NaiveDate, f64)>,
    },
    /// Flat continuously-compounded rate.
    ContinuousCompounding {
        /// The flat rate.
        rate: f64,
    },
}

/// A historical fixing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fixing {
    /// Fixing date.
    pub t: NaiveDate,
    /// Fixed value.
    pub value: f64,
}

/// Everything the engine needs to know about one currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcyMarket {
    /// Rate definitions by name.
    pub rates: BTreeMap<String, Underlying>,
    /// Yield curves by name.
    pub curves: BTreeMap<String, YieldCurve>,
    /// Historical fixings by rate name.
    pub fixings: BTreeMap<String, Vec<Fixing>>,
    /// The loaded vol cube.
    pub volatility: VolatilityCube,
    /// Quoting conventions the cube is expressed in.
    pub vol_conventions: VolConventions,
}

/// A holiday calendar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// Non-business dates.
    pub holidays: Vec<NaiveDate>,
}

/// Static reference data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Static {
    /// Holiday calendars by name.
    pub calendars: BTreeMap<String, Calendar>,
}

/// Parameters for a single-cell arbitrage check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageParams {
    /// Reference (pricing) date.
    pub t_ref: NaiveDate,
    /// Per-currency market data.
    pub market: BTreeMap<String, CcyMarket>,
    /// Static reference data.
    #[serde(rename = "static")]
    pub static_data: Static,
    /// Currency of the cell.
    pub currency: String,
    /// Underlying tenor of the cell.
    pub tenor: Period,
    /// Expiry of the cell.
    pub expiry: Period,
}

/// Parameters for a full-matrix arbitrage check.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageMatrixParams {
    /// Reference (pricing) date.
    pub t_ref: NaiveDate,
    /// Per-currency market data.
    pub market: BTreeMap<String, CcyMarket>,
    /// Static reference data.
    #[serde(rename = "static")]
    pub static_data: Static,
    /// Currency whose cube is checked.
    pub currency: String,
}

/// Parameters for implied-density vol sampling of one cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolSamplingParams {
    /// Reference (pricing) date.
    pub t_ref: NaiveDate,
    /// Per-currency market data.
    pub market: BTreeMap<String, CcyMarket>,
    /// Static reference data.
    #[serde(rename = "static")]
    pub static_data: Static,
    /// Currency of the cell.
    pub currency: String,
    /// Underlying tenor of the cell.
    pub tenor: Period,
    /// Expiry of the cell.
    pub expiry: Period,
    /// Sample count between the quoted strikes.
    pub n_samples_middle: u32,
    /// Sample count in each tail.
    pub n_samples_tail: u32,
    /// Tail width in standard deviations.
    pub n_stdvs_tail: u32,
}

/// Failure assembling a market from stored conventions.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// The swap conventions reference a floating rate that is not stored.
    #[error("floating rate {0:?} referenced by swap conventions is not stored")]
    MissingFloatingRate(String),
}

/// Flat placeholder curve level used until real curve bootstrapping lands.
const PLACEHOLDER_RATE: f64 = 0.9;

/// Build the `(market, static)` pair for one currency from its stored
/// conventions, the stored Libor definitions, and a loaded vol cube.
///
/// Curves are flat placeholders; fixings are empty; calendars carry no
/// holidays. The engine only needs their names resolved consistently.
pub fn build_market(
    currency: &str,
    cube: &VolatilityCube,
    conventions: &VolatilityMarketConventions,
    libor_rates: &BTreeMap<String, Libor>,
) -> Result<(BTreeMap<String, CcyMarket>, Static), MarketError> {
    let (_, libor_conv) = &conventions.libor_rate;
    let (_, swap_conv) = &conventions.swap_rate;

    let floating_name = swap_conv.floating_rate.clone();
    let floating = libor_rates
        .get(&floating_name)
        .ok_or_else(|| MarketError::MissingFloatingRate(floating_name.clone()))?;

    let mut rates = BTreeMap::new();
    let _ = rates.insert(floating_name, Underlying::Libor(floating.clone()));

    let flat = || YieldCurve::ContinuousCompounding {
        rate: PLACEHOLDER_RATE,
    };
    let mut curves = BTreeMap::new();
    let _ = curves.insert(libor_conv.reset_curve.name.clone(), flat());
    let _ = curves.insert(swap_conv.discount_curve.name.clone(), flat());
    let _ = curves.insert(floating.reset_curve.name.clone(), flat());

    let ccy_market = CcyMarket {
        rates,
        curves,
        fixings: BTreeMap::new(),
        volatility: cube.clone(),
        vol_conventions: VolConventions {
            libor_rate: libor_conv.clone(),
            swap_rate: swap_conv.clone(),
            boundary_tenor: conventions.boundary_tenor.clone(),
        },
    };

    let mut market = BTreeMap::new();
    let _ = market.insert(currency.to_owned(), ccy_market);

    let empty = || Calendar {
        holidays: Vec::new(),
    };
    let mut calendars = BTreeMap::new();
    let _ = calendars.insert(libor_conv.calendar.clone(), empty());
    let _ = calendars.insert(swap_conv.calendar.clone(), empty());
    let _ = calendars.insert(floating.calendar.clone(), empty());

    Ok((market, Static { calendars }))
}
