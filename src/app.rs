use std::{future::IntoFuture, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::net::TcpListener;

use crate::{
    ai::ClassifierClient,
    config::AppConfig,
    http::{build_router, AppState},
    infrastructure::shutdown::Shutdown,
    normalizer::RequestNormalizer,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RelayApp {
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Shutdown,
}

impl RelayApp {
    pub async fn initialize(config: AppConfig, shutdown: Shutdown) -> Result<Self> {
        if config.classifier.api_key.is_none() {
            tracing::warn!(
                target: "config",
                "CLASSIFIER_API_KEY is not set; /detect will answer with a server error"
            );
        }

        let http_client = Client::builder()
            .user_agent(format!("phishguard-relay/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let classifier = ClassifierClient::new(http_client, config.classifier.clone());
        let normalizer = RequestNormalizer::new(classifier, &config.detection);
        tracing::info!(
            target: "config",
            strategy = ?normalizer.strategy(),
            flavor = ?config.classifier.flavor,
            endpoint = %config.classifier.api_url,
            model = %config.classifier.model,
            trusted_domains = normalizer.trusted_domains().len(),
            "classifier pipeline ready"
        );

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.bind_addr))?;

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(normalizer)),
            shutdown,
        })
    }

    pub async fn run(self) -> Result<()> {
        let RelayApp {
            listener,
            state,
            shutdown,
        } = self;

        let addr = listener.local_addr()?;
        tracing::info!(target: "http", %addr, "phishing relay listening");

        let router = build_router(state);
        let graceful = shutdown.subscribe().notified();
        let mut server = Box::pin(
            axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .into_future(),
        );

        let mut stop = Box::pin(shutdown.subscribe().notified());
        tokio::select! {
            res = &mut server => {
                res.context("http server failed")?;
                tracing::info!(target: "http", "http server stopped");
                return Ok(());
            }
            _ = &mut stop => {
                tracing::info!(target: "http", "stop signal received; draining in-flight requests");
            }
        }

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut server).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(target: "http", ?err, "http server failed while draining");
            }
            Err(_) => {
                tracing::warn!(
                    target: "http",
                    "in-flight requests did not finish within {:?}; forcing exit",
                    SHUTDOWN_TIMEOUT
                );
            }
        }

        tracing::info!("relay stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::config::{
        ApiFlavor, ClassifierConfig, DetectionConfig, DirectoryConfig, LoggingConfig,
        ParseStrategy,
    };

    fn local_config() -> AppConfig {
        AppConfig {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            classifier: ClassifierConfig {
                api_key: None,
                api_url: "http://127.0.0.1:9/unused".into(),
                flavor: ApiFlavor::ChatCompletions,
                model: "test-model".into(),
                timeout: Duration::from_secs(1),
                max_tokens: 64,
            },
            detection: DetectionConfig {
                strategy: ParseStrategy::StrictJson,
                extra_trusted_domains: Vec::new(),
            },
            directories: DirectoryConfig {
                logs_dir: "logs".into(),
            },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    #[tokio::test]
    async fn run_returns_after_stop_signal() {
        let shutdown = Shutdown::new();
        let app = RelayApp::initialize(local_config(), shutdown.clone())
            .await
            .unwrap();
        let handle = tokio::spawn(app.run());

        shutdown.trigger();
        let res = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("relay stopped in time")
            .unwrap();
        assert!(res.is_ok());
    }
}
