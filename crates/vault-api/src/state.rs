//! Application state shared across API handlers

use std::sync::Arc;

use hello_validator::HelloContract;
use koios_client::KoiosClient;
use vault_core::AppConfig;
use vault_session::{Session, SessionSettings};
use wallet_bridge::WalletBridge;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    koios: KoiosClient,
    bridge: WalletBridge,
    session: Arc<Session>,
}

impl AppState {
    /// Wire a session that signs through the bridge and queries Koios
    pub fn new(
        config: AppConfig,
        koios: KoiosClient,
        bridge: WalletBridge,
        contract: HelloContract,
    ) -> Self {
        let session = Session::new(
            Arc::new(bridge.clone()),
            Arc::new(koios.clone()),
            Arc::new(contract),
            SessionSettings::from(&config),
        );
        Self::with_session(config, koios, bridge, Arc::new(session))
    }

    /// Use an already built session, e.g. one with other providers
    pub fn with_session(
        config: AppConfig,
        koios: KoiosClient,
        bridge: WalletBridge,
        session: Arc<Session>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                koios,
                bridge,
                session,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn koios(&self) -> &KoiosClient {
        &self.inner.koios
    }

    pub fn bridge(&self) -> &WalletBridge {
        &self.inner.bridge
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn contract(&self) -> &HelloContract {
        self.inner.session.contract()
    }
}
