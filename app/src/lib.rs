//! hello-vault application library

use anyhow::Context;
use hello_validator::HelloContract;
use koios_client::KoiosClient;
use vault_api::AppState;
use vault_core::AppConfig;
use wallet_bridge::WalletBridge;

fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["hello_vault=debug", "info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load config and contract, wire the providers, and serve until the
/// server stops
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(network = %config.network.as_str(), "Starting hello-vault");

    let contract = HelloContract::load(&config.contract.artifact_path, config.network)
        .with_context(|| {
            format!(
                "failed to load contract artifact {}",
                config.contract.artifact_path.display()
            )
        })?;
    tracing::info!(
        script_hash = %contract.script_hash(),
        address = %contract.address(),
        "Contract loaded"
    );

    let koios = KoiosClient::from_config(&config).context("failed to create Koios client")?;
    let status = koios.refresh_status().await;
    if status.is_online {
        tracing::info!(
            url = %koios.base_url(),
            tip_height = status.tip_height.unwrap_or_default(),
            tier = status.tier.as_str(),
            "Koios reachable"
        );
    } else {
        tracing::warn!(url = %koios.base_url(), "Koios unreachable, continuing");
    }

    let bridge = WalletBridge::new(&config.bridge);
    bridge.spawn_cleanup();

    let port = config.api_port;
    let state = AppState::new(config, koios, bridge, contract);
    vault_api::start_server(state, port)
        .await
        .with_context(|| format!("API server on port {} failed", port))
}
