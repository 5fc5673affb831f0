use message::ChainId;
use num_bigint::BigUint;
use relayer_lib::api::HealthApi;
use relayer_lib::blockstore::Blockstore;
use relayer_lib::chain::{ChainHandle, ChainSource};
use relayer_lib::health::HealthMonitor;
use relayer_lib::metrics::MetricsRegistry;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    info!("Starting relayer status server demo");

    match run_demo().await {
        Ok(_) => {
            info!("Status server stopped");
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("Status server failed: {}", error);
            ExitCode::FAILURE
        }
    }
}

async fn run_demo() -> anyhow::Result<()> {
    // Two simulated chains: goerli keeps producing blocks, kusama stalls
    // after a while so /health/kusama eventually turns stale.
    let goerli = Arc::new(ChainHandle::new("goerli", ChainId::from(5)));
    let kusama = Arc::new(ChainHandle::new("kusama", ChainId::from(2)));

    let monitor = Arc::new(HealthMonitor::new(
        vec![
            goerli.clone() as Arc<dyn ChainSource>,
            kusama.clone() as Arc<dyn ChainSource>,
        ],
        time::Duration::seconds(30),
    ));
    let metrics = Arc::new(MetricsRegistry::new(["goerli", "kusama"]));

    // Checkpoints survive restarts: rerun the demo and goerli resumes from
    // the last stored height.
    let checkpoint_dir = std::env::temp_dir().join("relayer-status-demo");
    let store = Blockstore::new(Some(checkpoint_dir), goerli.id(), "demo")?;
    let start = store.load_latest()?;
    info!(
        "Resuming goerli from height {} (checkpoint file {})",
        start,
        store.path().display()
    );

    let api = HealthApi::new(monitor, metrics.clone());

    // Simulated listener loop
    let goerli_metrics = metrics
        .chain("goerli")
        .ok_or_else(|| anyhow::anyhow!("goerli metrics missing"))?;
    let listener_goerli = goerli.clone();
    let listener_kusama = kusama.clone();
    tokio::spawn(async move {
        let mut height = start;
        let mut kusama_height = 0u32;
        let mut interval = tokio::time::interval(Duration::from_secs(2));
        loop {
            interval.tick().await;

            height += 1u32;
            listener_goerli.update(height.clone());
            if let Err(err) = store.store_block(&height) {
                error!("Failed to store goerli checkpoint: {}", err);
            }
            goerli_metrics.increment_blocks_processed();
            goerli_metrics.set_latest_processed_block(height.clone());
            goerli_metrics.set_latest_known_block(&height + 4u32);

            if kusama_height < 10 {
                kusama_height += 1;
                listener_kusama.update(BigUint::from(kusama_height));
            }

            info!("Listener tick: goerli={} kusama={}", height, kusama_height);
        }
    });

    info!("Try: curl localhost:8080/health/goerli | jq");
    info!("Try: curl localhost:8080/health/kusama | jq   (stale after ~30s)");
    info!("Try: curl localhost:8080/metrics | jq");
    info!("Swagger UI at http://localhost:8080/swagger-ui");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received");
            let _ = shutdown_tx.send(());
        }
    });

    api.serve("127.0.0.1:8080", shutdown_rx).await
}
