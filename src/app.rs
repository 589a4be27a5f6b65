use crate::analyzer::Analyzer;
use crate::config::Config;
use crate::labels::load_imagenet_labels;
use crate::ort_classifier::OrtClassifier;
use crate::server::HttpServer;

use std::{error::Error, sync::Arc};
use tokio::{signal, sync::broadcast};

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    let labels = match load_imagenet_labels(&config.labels.get_path()) {
        Ok(labels) => labels,
        Err(e) => {
            tracing::error!("Failed to load label vocabulary: {:?}", e);
            return Err(Box::new(e));
        }
    };

    let classifier = match OrtClassifier::new(&config.model, labels) {
        Ok(classifier) => classifier,
        Err(e) => {
            tracing::error!("Failed to initialize classifier: {:?}", e);
            return Err(e);
        }
    };

    let analyzer = Arc::new(Analyzer::new(classifier));
    let server = HttpServer::new(analyzer, &config).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let server_shutdown_rx = shutdown_tx.subscribe();

    let server_handle = server.run(server_shutdown_rx).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown.");

    let _ = shutdown_tx.send(());
    let _ = server_handle.await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
