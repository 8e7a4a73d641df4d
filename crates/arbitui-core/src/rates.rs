//! Rate definitions and their convention projections.
//!
//! Wire form is camelCase with a `type` tag on the underlying rate kinds,
//! matching the pricing engine's expectations.

use serde::{Deserialize, Serialize};

use crate::period::Period;

/// A named yield curve reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Curve {
    /// Curve name (e.g. `EUR-ESTR`).
    pub name: String,
    /// Curve currency.
    pub currency: String,
}

/// Schedule roll direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Roll dates forward from the start date.
    Forward,
    /// Roll dates backward from the end date.
    Backward,
}

/// Stub placement for irregular schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StubConvention {
    /// Short stub period.
    Short,
    /// Long stub period.
    Long,
}

/// Business-day adjustment rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessDayConvention {
    /// Next business day.
    Following,
    /// Previous business day.
    Preceding,
    /// Next business day unless it crosses a month end.
    ModifiedFollowing,
}

/// Day-count convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCounter {
    /// Actual days over 360.
    Act360,
    /// Actual days over 365.
    Act365,
}

/// A Libor-style forward-looking rate definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Libor {
    /// Currency of the rate.
    pub currency: String,
    /// Underlying tenor (e.g. `6M`).
    pub tenor: Period,
    /// Business days from fixing to value date.
    pub spot_lag: u32,
    /// Accrual day count.
    pub day_counter: DayCounter,
    /// Holiday calendar name.
    pub calendar: String,
    /// Curve the forward resets off.
    pub reset_curve: Curve,
    /// Date adjustment rule.
    pub bd_convention: BusinessDayConvention,
}

/// A par swap rate definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRate {
    /// Swap maturity (e.g. `10Y`).
    pub tenor: Period,
    /// Business days from fixing to the swap start.
    pub spot_lag: u32,
    /// Business days from period end to payment.
    pub payment_delay: u32,
    /// Fixed-leg coupon period.
    pub fixed_period: Period,
    /// Name of the floating-leg rate (a [`Libor`] key).
    pub floating_rate: String,
    /// Fixed-leg day count.
    pub fixed_day_counter: DayCounter,
    /// Holiday calendar name.
    pub calendar: String,
    /// Date adjustment rule.
    pub bd_convention: BusinessDayConvention,
    /// Curve both legs discount on.
    pub discount_curve: Curve,
    /// Stub placement, long by default.
    #[serde(default = "default_stub")]
    pub stub: StubConvention,
    /// Roll direction, backward by default.
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_stub() -> StubConvention {
    StubConvention::Long
}

fn default_direction() -> Direction {
    Direction::Backward
}

/// A rate definition as stored and shipped to the engine, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Underlying {
    /// A forward-looking term rate.
    Libor(Libor),
    /// A par swap rate.
    SwapRate(SwapRate),
}

/// Conventions projected from a [`Libor`] (everything but the tenor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiborConventions {
    /// Currency of the rate.
    pub currency: String,
    /// Business days from fixing to value date.
    pub spot_lag: u32,
    /// Accrual day count.
    pub day_counter: DayCounter,
    /// Holiday calendar name.
    pub calendar: String,
    /// Curve the forward resets off.
    pub reset_curve: Curve,
    /// Date adjustment rule.
    pub bd_convention: BusinessDayConvention,
}

/// Conventions projected from a [`SwapRate`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRateConventions {
    /// Business days from fixing to the swap start.
    pub spot_lag: u32,
    /// Business days from period end to payment.
    pub payment_delay: u32,
    /// Fixed-leg coupon period.
    pub fixed_period: Period,
    /// Name of the floating-leg rate.
    pub floating_rate: String,
    /// Fixed-leg day count.
    pub fixed_day_counter: DayCounter,
    /// Holiday calendar name.
    pub calendar: String,
    /// Date adjustment rule.
    pub bd_convention: BusinessDayConvention,
    /// Stub placement.
    pub stub: StubConvention,
    /// Roll direction.
    pub direction: Direction,
    /// Curve both legs discount on.
    pub discount_curve: Curve,
}

impl Libor {
    /// Project the convention fields.
    pub fn to_conventions(&self) -> LiborConventions {
        LiborConventions {
            currency: self.currency.clone(),
            spot_lag: self.spot_lag,
            day_counter: self.day_counter,
            calendar: self.calendar.clone(),
            reset_curve: self.reset_curve.clone(),
            bd_convention: self.bd_convention,
        }
    }
}

impl SwapRate {
    /// Project the convention fields.
    pub fn to_conventions(&self) -> SwapRateConventions {
        SwapRateConventions {
            spot_lag: self.spot_lag,
            payment_delay: self.payment_delay,
            fixed_period: self.fixed_period,
            floating_rate: self.floating_rate.clone(),
            fixed_day_counter: self.fixed_day_counter,
            calendar: self.calendar.clone(),
            bd_convention: self.bd_convention,
            stub: self.stub,
            direction: self.direction,
            discount_curve: self.discount_curve.clone(),
        }
    }
}

/// Per-currency volatility quoting conventions, carrying the names of the
/// reference rates alongside their projections (the UI-facing shape).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityMarketConventions {
    /// (name, conventions) of the reference Libor rate.
    pub libor_rate: (String, LiborConventions),
    /// (name, conventions) of the reference swap rate.
    pub swap_rate: (String, SwapRateConventions),
    /// Tenor separating caplet-quoted from swaption-quoted vols.
    pub boundary_tenor: String,
}

/// The engine-facing conventions shape (projections only, no names).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolConventions {
    /// Conventions of the reference Libor rate.
    pub libor_rate: LiborConventions,
    /// Conventions of the reference swap rate.
    pub swap_rate: SwapRateConventions,
    /// Tenor separating caplet-quoted from swaption-quoted vols.
    pub boundary_tenor: String,
}
