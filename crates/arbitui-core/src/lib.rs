//! # arbitui-core
//!
//! Domain types shared across the arbitui gateway: tenor periods, rate
//! definitions and their convention projections, volatility cubes, and the
//! market/static payloads every pricing-engine call carries.
//!
//! Everything here is pure data plus assembly; no I/O.

#![deny(unsafe_code)]

pub mod logging;
pub mod market;
pub mod period;
pub mod rates;
pub mod results;
pub mod vol;

pub use market::{
    ArbitrageParams, ArbitrageMatrixParams, Calendar, CcyMarket, Fixing, MarketError, Static,
    VolSamplingParams, YieldCurve, build_market,
};
pub use period::{Period, PeriodParseError, Unit};
pub use rates::{
    BusinessDayConvention, Curve, DayCounter, Direction, Libor, LiborConventions, StubConvention,
    SwapRate, SwapRateConventions, Underlying, VolConventions, VolatilityMarketConventions,
};
pub use results::{Arbitrage, ArbitrageCheck, ArbitrageMatrix, VolSampling};
pub use vol::{CubeFile, VolUnit, VolatilityCube, VolatilitySkew, VolatilitySurface};
