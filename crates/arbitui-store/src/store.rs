//! Typed queries over the rate/conventions tables.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use arbitui_core::{Libor, SwapRate, VolatilityMarketConventions};

use crate::connection::ConnectionPool;
use crate::errors::{Result, StoreError};

const KIND_LIBOR: &str = "libor_rate";
const KIND_SWAP: &str = "swap_rate";

/// Handle over the conventions/rates database.
///
/// Methods are synchronous single-row lookups; async callers invoke them
/// directly from their own task.
#[derive(Clone)]
pub struct Store {
    pool: ConnectionPool,
}

impl Store {
    /// Wrap a connection pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    fn rates_of_kind<T: DeserializeOwned>(
        &self,
        currency: &str,
        kind: &str,
    ) -> Result<BTreeMap<String, T>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT name, js FROM rate WHERE currency = ?1 AND type = ?2")?;
        let rows = stmt.query_map((currency, kind), |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = BTreeMap::new();
        for row in rows {
            let (name, js) = row?;
            let rate: T = serde_json::from_str(&js)?;
            let _ = out.insert(name, rate);
        }
        Ok(out)
    }

    fn rate_of_kind<T: DeserializeOwned>(
        &self,
        currency: &str,
        name: &str,
        kind: &str,
        what: &'static str,
    ) -> Result<T> {
        let conn = self.pool.get()?;
        let js: String = conn
            .query_row(
                "SELECT js FROM rate WHERE currency = ?1 AND name = ?2 AND type = ?3",
                (currency, name, kind),
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::not_found(what, currency),
                other => StoreError::Sqlite(other),
            })?;
        Ok(serde_json::from_str(&js)?)
    }

    /// All stored Libor definitions for a currency, by name.
    pub fn get_libor_rates(&self, currency: &str) -> Result<BTreeMap<String, Libor>> {
        self.rates_of_kind(currency, KIND_LIBOR)
    }

    /// All stored swap-rate definitions for a currency, by name.
    pub fn get_swap_rates(&self, currency: &str) -> Result<BTreeMap<String, SwapRate>> {
        self.rates_of_kind(currency, KIND_SWAP)
    }

    /// The volatility quoting conventions for a currency: the referenced
    /// rate definitions projected to their convention fields, plus the
    /// boundary tenor.
    pub fn get_conventions(&self, currency: &str) -> Result<VolatilityMarketConventions> {
        let (libor_name, swap_name) = {
            let conn = self.pool.get()?;
            conn.query_row(
                "SELECT libor_rate, swap_rate FROM vol_conventions WHERE currency = ?1",
                [currency],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::not_found("vol conventions", currency)
                }
                other => StoreError::Sqlite(other),
            })?
        };

        let libor: Libor =
            self.rate_of_kind(currency, &libor_name, KIND_LIBOR, "referenced libor rate")?;
        let swap: SwapRate =
            self.rate_of_kind(currency, &swap_name, KIND_SWAP, "referenced swap rate")?;

        let boundary_tenor = {
            let conn = self.pool.get()?;
            conn.query_row(
                "SELECT boundary_tenor FROM generic_conventions WHERE currency = ?1",
                [currency],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::not_found("generic conventions", currency)
                }
                other => StoreError::Sqlite(other),
            })?
        };

        Ok(VolatilityMarketConventions {
            libor_rate: (libor_name, libor.to_conventions()),
            swap_rate: (swap_name, swap.to_conventions()),
            boundary_tenor,
        })
    }

    fn put_rate<T: Serialize>(&self, currency: &str, name: &str, kind: &str, rate: &T) -> Result<()> {
        let js = serde_json::to_string(rate)?;
        let conn = self.pool.get()?;
        let _ = conn.execute(
            "INSERT INTO rate (currency, name, js, type) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (currency, name, type) DO UPDATE SET js = excluded.js",
            (currency, name, js, kind),
        )?;
        Ok(())
    }

    /// Insert or replace a Libor definition.
    pub fn put_libor_rate(&self, currency: &str, name: &str, rate: &Libor) -> Result<()> {
        self.put_rate(currency, name, KIND_LIBOR, rate)
    }

    /// Insert or replace a swap-rate definition.
    pub fn put_swap_rate(&self, currency: &str, name: &str, rate: &SwapRate) -> Result<()> {
        self.put_rate(currency, name, KIND_SWAP, rate)
    }

    /// Point a currency's vol conventions at stored rate names.
    pub fn put_vol_conventions(
        &self,
        currency: &str,
        libor_name: &str,
        swap_name: &str,
        boundary_tenor: &str,
    ) -> Result<()> {
        let conn = self.pool.get()?;
        let _ = conn.execute(
            "INSERT INTO vol_conventions (currency, libor_rate, swap_rate) VALUES (?1, ?2, ?3) \
             ON CONFLICT (currency) DO UPDATE SET \
             libor_rate = excluded.libor_rate, swap_rate = excluded.swap_rate",
            (currency, libor_name, swap_name),
        )?;
        let _ = conn.execute(
            "INSERT INTO generic_conventions (currency, boundary_tenor) VALUES (?1, ?2) \
             ON CONFLICT (currency) DO UPDATE SET boundary_tenor = excluded.boundary_tenor",
            (currency, boundary_tenor),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbitui_core::{BusinessDayConvention, Curve, DayCounter, Period, Unit};

    use crate::connection::{ConnectionConfig, new_in_memory};
    use crate::migrations::run_migrations;

    fn make_store() -> Store {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        run_migrations(&pool.get().unwrap()).unwrap();
        Store::new(pool)
    }

    fn sample_libor() -> Libor {
        Libor {
            currency: "EUR".into(),
            tenor: Period::new(6, Unit::Month),
            spot_lag: 2,
            day_counter: DayCounter::Act360,
            calendar: "TARGET".into(),
            reset_curve: Curve {
                name: "EUR-OIS".into(),
                currency: "EUR".into(),
            },
            bd_convention: BusinessDayConvention::ModifiedFollowing,
        }
    }

    fn sample_swap() -> SwapRate {
        serde_json::from_value(serde_json::json!({
            "tenor": "10Y",
            "spotLag": 2,
            "paymentDelay": 0,
            "fixedPeriod": "1Y",
            "floatingRate": "EURIBOR6M",
            "fixedDayCounter": "Act365",
            "calendar": "TARGET",
            "bdConvention": "ModifiedFollowing",
            "discountCurve": {"name": "EUR-OIS", "currency": "EUR"},
        }))
        .unwrap()
    }

    #[test]
    fn rates_round_trip() {
        let store = make_store();
        store.put_libor_rate("EUR", "EURIBOR6M", &sample_libor()).unwrap();
        store.put_swap_rate("EUR", "EUR-SWAP", &sample_swap()).unwrap();

        let libors = store.get_libor_rates("EUR").unwrap();
        assert_eq!(libors.len(), 1);
        assert_eq!(libors["EURIBOR6M"], sample_libor());

        let swaps = store.get_swap_rates("EUR").unwrap();
        assert_eq!(swaps["EUR-SWAP"], sample_swap());
    }

    #[test]
    fn rates_scoped_by_currency_and_kind() {
        let store = make_store();
        store.put_libor_rate("EUR", "EURIBOR6M", &sample_libor()).unwrap();

        assert!(store.get_libor_rates("USD").unwrap().is_empty());
        assert!(store.get_swap_rates("EUR").unwrap().is_empty());
    }

    #[test]
    fn put_rate_upserts() {
        let store = make_store();
        let mut libor = sample_libor();
        store.put_libor_rate("EUR", "EURIBOR6M", &libor).unwrap();
        libor.spot_lag = 3;
        store.put_libor_rate("EUR", "EURIBOR6M", &libor).unwrap();

        let libors = store.get_libor_rates("EUR").unwrap();
        assert_eq!(libors.len(), 1);
        assert_eq!(libors["EURIBOR6M"].spot_lag, 3);
    }

    #[test]
    fn conventions_resolve_references() {
        let store = make_store();
        store.put_libor_rate("EUR", "EURIBOR6M", &sample_libor()).unwrap();
        store.put_swap_rate("EUR", "EUR-SWAP", &sample_swap()).unwrap();
        store
            .put_vol_conventions("EUR", "EURIBOR6M", "EUR-SWAP", "2Y")
            .unwrap();

        let conv = store.get_conventions("EUR").unwrap();
        assert_eq!(conv.libor_rate.0, "EURIBOR6M");
        assert_eq!(conv.libor_rate.1, sample_libor().to_conventions());
        assert_eq!(conv.swap_rate.0, "EUR-SWAP");
        assert_eq!(conv.boundary_tenor, "2Y");
    }

    #[test]
    fn missing_conventions_is_not_found() {
        let store = make_store();
        let err = store.get_conventions("JPY").unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { what: "vol conventions", .. }
        ));
    }

    #[test]
    fn dangling_reference_is_not_found() {
        let store = make_store();
        // Conventions point at rates that were never stored.
        store
            .put_vol_conventions("EUR", "EURIBOR6M", "EUR-SWAP", "2Y")
            .unwrap();
        let err = store.get_conventions("EUR").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn corrupt_blob_surfaces_as_corrupt() {
        let store = make_store();
        {
            let conn = store.pool.get().unwrap();
            let _ = conn
                .execute(
                    "INSERT INTO rate (currency, name, js, type) \
                     VALUES ('EUR', 'BAD', '{\"nope\": 1}', 'libor_rate')",
                    [],
                )
                .unwrap();
        }
        let err = store.get_libor_rates("EUR").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
