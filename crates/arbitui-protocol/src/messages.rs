//! Tagged message envelopes exchanged with UI clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use arbitui_core::{
    ArbitrageCheck, Libor, Period, SwapRate, VolSampling, VolatilityCube,
    VolatilityMarketConventions,
};

/// Messages received from a UI client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Heartbeat probe.
    Ping,
    /// Load a cube file from disk and report everything derived from it.
    LoadCube { file_path: String },
    /// Fetch the stored vol quoting conventions for a currency.
    GetConventions { currency: String },
    /// Fetch the stored rate definitions for a currency.
    GetRates { currency: String },
    /// Run the arbitrage check over every cell of the cube.
    GetArbitrageMatrix {
        currency: String,
        vol_cube: VolatilityCube,
    },
    /// Run the arbitrage check for one cell.
    GetArbitrageCheck {
        currency: String,
        vol_cube: VolatilityCube,
        tenor: Period,
        expiry: Period,
    },
    /// Sample implied vol and density for one cell.
    GetVolSamples {
        currency: String,
        vol_cube: VolatilityCube,
        tenor: Period,
        expiry: Period,
    },
}

/// Severity of a pushed notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A request or load failed.
    Error,
    /// Something degraded but the request went through.
    Warning,
    /// Progress or status worth surfacing.
    Information,
}

/// Messages pushed to a UI client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Heartbeat reply / liveness push.
    Pong,
    /// A cube was loaded.
    VolaCube {
        currency: String,
        cube: VolatilityCube,
    },
    /// Stored conventions for a currency.
    Conventions {
        currency: String,
        conventions: VolatilityMarketConventions,
    },
    /// Stored rate definitions for a currency.
    Rates {
        currency: String,
        libor_rates: BTreeMap<String, Libor>,
        swap_rates: BTreeMap<String, SwapRate>,
    },
    /// Per-cell arbitrage findings for a whole cube.
    ArbitrageMatrix {
        currency: String,
        matrix: Vec<(Period, Period, ArbitrageCheck)>,
    },
    /// Arbitrage finding for one cell.
    ArbitrageCheck {
        currency: String,
        tenor: Period,
        expiry: Period,
        check: ArbitrageCheck,
    },
    /// Sampled vol/density data for one cell.
    VolSamples {
        currency: String,
        tenor: Period,
        expiry: Period,
        samples: VolSampling,
    },
    /// Out-of-band status push.
    Notification { msg: String, severity: Severity },
}

impl ServerMsg {
    /// Shorthand for an error notification.
    pub fn error(msg: impl Into<String>) -> Self {
        ServerMsg::Notification {
            msg: msg.into(),
            severity: Severity::Error,
        }
    }

    /// Shorthand for an information notification.
    pub fn info(msg: impl Into<String>) -> Self {
        ServerMsg::Notification {
            msg: msg.into(),
            severity: Severity::Information,
        }
    }
}
