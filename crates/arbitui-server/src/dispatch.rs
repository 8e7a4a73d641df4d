//! Request dispatch: maps each client message to store lookups and engine
//! calls, pushing results onto the session's outbound queue.
//!
//! Every request path is isolated: a failing lookup or engine call produces
//! an error notification (and a log line) but never ends the session.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::error::Category;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use arbitui_core::{
    ArbitrageCheck, ArbitrageMatrixParams, ArbitrageParams, CcyMarket, CubeFile, Libor,
    MarketError, Period, Static, SwapRate, VolSamplingParams, VolatilityCube,
    VolatilityMarketConventions, build_market,
};
use arbitui_protocol::{ClientMsg, ServerMsg};
use arbitui_rpc::{EngineClient, EngineClientExt, RpcError};
use arbitui_store::{Store, StoreError};

use crate::websocket::session::Session;

/// Vol sampling resolution, as quoted to the engine.
const N_SAMPLES_MIDDLE: u32 = 100;
const N_SAMPLES_TAIL: u32 = 10;
const N_STDVS_TAIL: u32 = 4;

/// How `get_arbitrage_matrix` talks to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatrixStrategy {
    /// One concurrent `arbitrage` call per (tenor, expiry) cell.
    PerCell,
    /// One `arbitrage-matrix` call for the whole cube.
    Bulk,
}

impl MatrixStrategy {
    /// Map the `bulk_arbitrage_matrix` setting onto a strategy.
    pub fn from_bulk_flag(bulk: bool) -> Self {
        if bulk {
            MatrixStrategy::Bulk
        } else {
            MatrixStrategy::PerCell
        }
    }
}

/// Dispatcher knobs, fixed per session.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Strategy for full-cube arbitrage requests.
    pub matrix_strategy: MatrixStrategy,
    /// Directory searched for cube files given by relative path.
    pub file_search_path: PathBuf,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            matrix_strategy: MatrixStrategy::Bulk,
            file_search_path: PathBuf::from("."),
        }
    }
}

/// A failed request path.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A store lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// An engine call failed.
    #[error(transparent)]
    Engine(#[from] RpcError),
    /// Market assembly failed.
    #[error(transparent)]
    Market(#[from] MarketError),
    /// A spawned worker panicked or was aborted.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Per-session request dispatcher.
///
/// The reference date for engine calls is pinned when the session starts,
/// so every request of one session prices off the same date.
pub struct Dispatcher {
    store: Store,
    engine: Arc<dyn EngineClient>,
    config: DispatchConfig,
    t_ref: NaiveDate,
}

impl Dispatcher {
    /// Build a dispatcher pinned to today's date.
    pub fn new(store: Store, engine: Arc<dyn EngineClient>, config: DispatchConfig) -> Self {
        Self {
            store,
            engine,
            config,
            t_ref: chrono::Local::now().date_naive(),
        }
    }

    #[cfg(test)]
    fn with_t_ref(mut self, t_ref: NaiveDate) -> Self {
        self.t_ref = t_ref;
        self
    }

    /// Handle one client message, pushing any results onto the session.
    pub async fn handle(&self, msg: ClientMsg, session: &Session) {
        match msg {
            ClientMsg::Ping => {
                info!(session = %session.id, "ping received");
                let _ = session.push(ServerMsg::Pong).await;
            }

            ClientMsg::LoadCube { file_path } => {
                self.load_cube(&file_path, session).await;
            }

            ClientMsg::GetConventions { currency } => match self.conventions(&currency).await {
                Ok(conventions) => {
                    let _ = session
                        .push(ServerMsg::Conventions {
                            currency,
                            conventions,
                        })
                        .await;
                }
                Err(err) => {
                    notify_error(session, "failed to return conventions".into(), &err).await;
                }
            },

            ClientMsg::GetRates { currency } => match self.rates(&currency).await {
                Ok((libor_rates, swap_rates)) => {
                    let _ = session
                        .push(ServerMsg::Rates {
                            currency,
                            libor_rates,
                            swap_rates,
                        })
                        .await;
                }
                Err(err) => {
                    notify_error(session, "failed to return rates".into(), &err).await;
                }
            },

            ClientMsg::GetArbitrageMatrix { currency, vol_cube } => {
                match self.arbitrage_matrix(&currency, &vol_cube).await {
                    Ok(matrix) => {
                        let _ = session
                            .push(ServerMsg::ArbitrageMatrix { currency, matrix })
                            .await;
                    }
                    Err(err) => {
                        notify_error(session, "failed to return arbitrage matrix".into(), &err)
                            .await;
                    }
                }
            }

            ClientMsg::GetArbitrageCheck {
                currency,
                vol_cube,
                tenor,
                expiry,
            } => match self.arbitrage_check(&currency, &vol_cube, tenor, expiry).await {
                Ok(check) => {
                    let _ = session
                        .push(ServerMsg::ArbitrageCheck {
                            currency,
                            tenor,
                            expiry,
                            check,
                        })
                        .await;
                }
                Err(err) => {
                    notify_error(
                        session,
                        format!("failed to check ({tenor},{expiry}) for arbitrage"),
                        &err,
                    )
                    .await;
                }
            },

            ClientMsg::GetVolSamples {
                currency,
                vol_cube,
                tenor,
                expiry,
            } => match self.vol_samples(&currency, &vol_cube, tenor, expiry).await {
                Ok(samples) => {
                    let _ = session
                        .push(ServerMsg::VolSamples {
                            currency,
                            tenor,
                            expiry,
                            samples,
                        })
                        .await;
                }
                Err(err) => {
                    notify_error(
                        session,
                        format!("failed to return sampled data for rate underlying ({tenor},{expiry})"),
                        &err,
                    )
                    .await;
                }
            },
        }
    }

    /// The `load_cube` flow: decode the file, then independently attempt
    /// every view derived from it. Each failing step yields its own error
    /// notification without blocking the others.
    async fn load_cube(&self, file_path: &str, session: &Session) {
        let path = self.resolve_path(file_path);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) => {
                error!(path = %path.display(), error = %err, "cube file unreadable");
                let _ = session
                    .push(ServerMsg::error(format!("failed to load {file_path}")))
                    .await;
                return;
            }
        };

        let cube_file: CubeFile = match serde_json::from_str(&content) {
            Ok(file) => file,
            Err(err) => {
                error!(path = %path.display(), error = %err, "cube file undecodable");
                let msg = if err.classify() == Category::Data {
                    format!("failed to validate json in {file_path}")
                } else {
                    format!("failed to decode json in {file_path}")
                };
                let _ = session.push(ServerMsg::error(msg)).await;
                return;
            }
        };

        let CubeFile { currency, data: cube } = cube_file;
        let _ = session
            .push(ServerMsg::VolaCube {
                currency: currency.clone(),
                cube: cube.clone(),
            })
            .await;

        match self.conventions(&currency).await {
            Ok(conventions) => {
                let _ = session
                    .push(ServerMsg::Conventions {
                        currency: currency.clone(),
                        conventions,
                    })
                    .await;
            }
            Err(err) => {
                notify_error(session, "failed to return conventions".into(), &err).await;
            }
        }

        match self.rates(&currency).await {
            Ok((libor_rates, swap_rates)) => {
                let _ = session
                    .push(ServerMsg::Rates {
                        currency: currency.clone(),
                        libor_rates,
                        swap_rates,
                    })
                    .await;
            }
            Err(err) => {
                notify_error(session, "failed to return rates".into(), &err).await;
            }
        }

        match self.arbitrage_matrix(&currency, &cube).await {
            Ok(matrix) => {
                let _ = session
                    .push(ServerMsg::ArbitrageMatrix {
                        currency: currency.clone(),
                        matrix,
                    })
                    .await;
                let _ = session
                    .push(ServerMsg::info("Arbitrage matrix constructed"))
                    .await;
            }
            Err(err) => {
                notify_error(session, "failed to return arbitrage matrix".into(), &err).await;
            }
        }

        let Some((tenor, expiry)) = cube.first_cell() else {
            warn!(currency, "loaded cube has no cells, skipping vol samples");
            return;
        };
        match self.vol_samples(&currency, &cube, tenor, expiry).await {
            Ok(samples) => {
                let _ = session
                    .push(ServerMsg::VolSamples {
                        currency,
                        tenor,
                        expiry,
                        samples,
                    })
                    .await;
            }
            Err(err) => {
                notify_error(
                    session,
                    format!("failed to return sampled data for rate underlying ({tenor},{expiry})"),
                    &err,
                )
                .await;
            }
        }
    }

    fn resolve_path(&self, file_path: &str) -> PathBuf {
        let path = PathBuf::from(file_path);
        if path.is_absolute() {
            path
        } else {
            self.config.file_search_path.join(path)
        }
    }

    // ── Store access (blocking rusqlite calls off the async threads) ────────

    async fn conventions(
        &self,
        currency: &str,
    ) -> Result<VolatilityMarketConventions, DispatchError> {
        let store = self.store.clone();
        let ccy = currency.to_owned();
        Ok(tokio::task::spawn_blocking(move || store.get_conventions(&ccy)).await??)
    }

    async fn libor_rates(&self, currency: &str) -> Result<BTreeMap<String, Libor>, DispatchError> {
        let store = self.store.clone();
        let ccy = currency.to_owned();
        Ok(tokio::task::spawn_blocking(move || store.get_libor_rates(&ccy)).await??)
    }

    async fn rates(
        &self,
        currency: &str,
    ) -> Result<(BTreeMap<String, Libor>, BTreeMap<String, SwapRate>), DispatchError> {
        let store = self.store.clone();
        let ccy = currency.to_owned();
        Ok(tokio::task::spawn_blocking(move || {
            let libor = store.get_libor_rates(&ccy)?;
            let swap = store.get_swap_rates(&ccy)?;
            Ok::<_, StoreError>((libor, swap))
        })
        .await??)
    }

    /// The `(market, static)` pair carried by every engine call.
    async fn market(
        &self,
        currency: &str,
        cube: &VolatilityCube,
    ) -> Result<(BTreeMap<String, CcyMarket>, Static), DispatchError> {
        let conventions = self.conventions(currency).await?;
        let libor_rates = self.libor_rates(currency).await?;
        Ok(build_market(currency, cube, &conventions, &libor_rates)?)
    }

    // ── Engine calls ────────────────────────────────────────────────────────

    async fn arbitrage_check(
        &self,
        currency: &str,
        cube: &VolatilityCube,
        tenor: Period,
        expiry: Period,
    ) -> Result<ArbitrageCheck, DispatchError> {
        let (market, static_data) = self.market(currency, cube).await?;
        let params = ArbitrageParams {
            t_ref: self.t_ref,
            market,
            static_data,
            currency: currency.to_owned(),
            tenor,
            expiry,
        };
        Ok(self.engine.arbitrage_check(&params).await?)
    }

    async fn vol_samples(
        &self,
        currency: &str,
        cube: &VolatilityCube,
        tenor: Period,
        expiry: Period,
    ) -> Result<arbitui_core::VolSampling, DispatchError> {
        let (market, static_data) = self.market(currency, cube).await?;
        let params = VolSamplingParams {
            t_ref: self.t_ref,
            market,
            static_data,
            currency: currency.to_owned(),
            tenor,
            expiry,
            n_samples_middle: N_SAMPLES_MIDDLE,
            n_samples_tail: N_SAMPLES_TAIL,
            n_stdvs_tail: N_STDVS_TAIL,
        };
        Ok(self.engine.vol_sampling(&params).await?)
    }

    async fn arbitrage_matrix(
        &self,
        currency: &str,
        cube: &VolatilityCube,
    ) -> Result<Vec<(Period, Period, ArbitrageCheck)>, DispatchError> {
        let (market, static_data) = self.market(currency, cube).await?;

        match self.config.matrix_strategy {
            MatrixStrategy::Bulk => {
                let params = ArbitrageMatrixParams {
                    t_ref: self.t_ref,
                    market,
                    static_data,
                    currency: currency.to_owned(),
                };
                let rsp = self.engine.arbitrage_matrix(&params).await?;
                Ok(rsp
                    .matrix
                    .into_iter()
                    .map(|(tenor, expiry, arbitrage)| {
                        (tenor, expiry, ArbitrageCheck { arbitrage })
                    })
                    .collect())
            }

            MatrixStrategy::PerCell => {
                let mut tasks: JoinSet<Result<(Period, Period, ArbitrageCheck), RpcError>> =
                    JoinSet::new();
                for (tenor, expiry) in cube.cells() {
                    let engine = Arc::clone(&self.engine);
                    let params = ArbitrageParams {
                        t_ref: self.t_ref,
                        market: market.clone(),
                        static_data: static_data.clone(),
                        currency: currency.to_owned(),
                        tenor,
                        expiry,
                    };
                    let _ = tasks.spawn(async move {
                        let check = engine.arbitrage_check(&params).await?;
                        Ok((tenor, expiry, check))
                    });
                }

                let mut matrix = Vec::with_capacity(tasks.len());
                while let Some(joined) = tasks.join_next().await {
                    match joined? {
                        Ok(cell) => matrix.push(cell),
                        Err(err) => {
                            // One failing cell fails the whole request.
                            tasks.abort_all();
                            return Err(err.into());
                        }
                    }
                }
                Ok(matrix)
            }
        }
    }
}

async fn notify_error(session: &Session, msg: String, err: &DispatchError) {
    error!(session = %session.id, error = %err, "{msg}");
    let _ = session.push(ServerMsg::error(msg)).await;
}
