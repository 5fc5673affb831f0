use std::sync::Arc;

use clap::{Command, arg, command};
use dotenv::dotenv;
use num_bigint::BigUint;
use relayer_lib::api::HealthApi;
use relayer_lib::blockstore::Blockstore;
use relayer_lib::chain::{ChainHandle, ChainSource};
use relayer_lib::health::HealthMonitor;
use relayer_lib::metrics::MetricsRegistry;
use tracing::warn;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{CliConfig, get_cli_config};

mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a missing .env is tolerated, config may come straight from the environment
    dotenv()
        .inspect_err(|err| println!("[WARN] reading .env files is failed with err {err}"))
        .ok();

    let config = get_cli_config()?;

    // logs
    let (non_blocking_appender, _guard_stdout) = tracing_appender::non_blocking(std::io::stdout());
    let stdout_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_appender)
        .with_filter(config.rust_log);
    tracing_subscriber::registry()
        .with(stdout_subscriber)
        .init();

    let matches = command!() // requires `cargo` feature
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("show")
                .alias("s")
                .about("print the stored checkpoint height for every configured chain"),
        )
        .subcommand(
            Command::new("set")
                .about("overwrite the stored checkpoint height for one chain")
                .arg(arg!([CHAIN]).required(true))
                .arg(arg!([HEIGHT]).required(true)),
        )
        .subcommand(
            Command::new("serve")
                .about("serve the stored checkpoint heights over the status endpoint"),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("show", _)) => show(&config),
        Some(("set", sub_matches)) => {
            let chain = sub_matches
                .get_one::<String>("CHAIN")
                .map(|s| s.as_str())
                .unwrap();
            let height = sub_matches
                .get_one::<String>("HEIGHT")
                .map(|s| s.as_str())
                .unwrap();

            set(&config, chain, height.parse()?)
        }
        Some(("serve", _)) => serve(&config).await,
        _ => Ok(()),
    }
}

fn open_store(config: &CliConfig, chain: message::ChainId) -> anyhow::Result<Blockstore> {
    Ok(Blockstore::new(
        config.relayer_checkpoint_dir.clone(),
        chain,
        &config.relayer_operator,
    )?)
}

fn show(config: &CliConfig) -> anyhow::Result<()> {
    for (name, id) in &config.relayer_chains.0 {
        let store = open_store(config, *id)?;
        let height = store.load_latest()?;
        println!("{name} (chain {id}): {height}  [{}]", store.path().display());
    }
    Ok(())
}

fn set(config: &CliConfig, chain_name: &str, height: BigUint) -> anyhow::Result<()> {
    let (name, id) = config
        .relayer_chains
        .0
        .iter()
        .find(|(name, _)| name.as_str() == chain_name)
        .ok_or_else(|| anyhow::anyhow!("chain {chain_name:?} is not configured"))?;

    let store = open_store(config, *id)?;
    store.store_block(&height)?;
    println!("{name} (chain {id}): {height}  [{}]", store.path().display());
    Ok(())
}

/// Exposes the last durable checkpoints as chain heights. Nothing advances
/// them here, so chains turn stale once the relayer has been down for longer
/// than the configured timeout.
async fn serve(config: &CliConfig) -> anyhow::Result<()> {
    let mut sources = Vec::new();
    let metrics = Arc::new(MetricsRegistry::new(
        config.relayer_chains.0.iter().map(|(name, _)| name.clone()),
    ));

    for (name, id) in &config.relayer_chains.0 {
        let store = open_store(config, *id)?;
        let height = store.load_latest()?;

        if let Some(chain_metrics) = metrics.chain(name) {
            chain_metrics.set_latest_processed_block(height.clone());
        }

        let handle = Arc::new(ChainHandle::new(name.clone(), *id));
        handle.update(height);
        sources.push(handle as Arc<dyn ChainSource>);
    }

    let monitor = Arc::new(HealthMonitor::new(
        sources,
        time::Duration::seconds(config.relayer_block_timeout_secs as i64),
    ));
    let api = HealthApi::new(monitor, metrics);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received");
            let _ = shutdown_tx.send(());
        }
    });

    api.serve(&config.relayer_status_bind, shutdown_rx).await
}
