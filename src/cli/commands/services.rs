//! Builds the service graph from configuration.

use std::sync::Arc;

use crate::capture::{FileReadinessWaiter, FileSource, PhotoSource};
use crate::config::{Config, ConfigError, EngineKind, RecognitionConfig};
use crate::enrichment::{
    CatalogResolver, DiscogsClient, EnrichmentAggregator, LastFmClient, http,
};
use crate::error::{Error, Result};
use crate::pipeline::PipelineOrchestrator;
use crate::recognition::{RecognitionBridge, RecognitionEngine, RemoteEngine, SubprocessEngine};

/// Everything a command needs, wired from one [`Config`].
pub struct Services {
    pub config: Config,
    pub resolver: CatalogResolver,
    pub aggregator: EnrichmentAggregator,
    pub recognition: RecognitionBridge,
}

impl Services {
    pub fn build(config: &Config) -> Result<Self> {
        let http_client = http::build_client(&config.http.settings())?;

        let discogs = DiscogsClient::with_base_url(
            http_client.clone(),
            config.credentials.discogs_token.clone(),
            config.catalog.base_url.clone(),
        );
        let resolver = CatalogResolver::with_filters(Arc::new(discogs), config.catalog.filters());

        let api_key = config.credentials.lastfm_api_key.clone().unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("No Last.fm API key configured; enrichment will be empty");
        }
        let lastfm = LastFmClient::with_base_url(
            http_client.clone(),
            api_key,
            config.recommendations.base_url.clone(),
        )
        .with_limits(
            config.recommendations.similar_limit,
            config.recommendations.top_tracks_limit,
        );
        let aggregator = EnrichmentAggregator::new(Arc::new(lastfm))
            .with_call_timeout(config.recommendations.call_timeout());

        let recognition = RecognitionBridge::new(build_engine(&config.recognition, http_client)?);

        Ok(Self {
            config: config.clone(),
            resolver,
            aggregator,
            recognition,
        })
    }

    /// Require a Last.fm key for commands that only enrich.
    pub fn require_lastfm_key(&self) -> Result<()> {
        match self.config.credentials.lastfm_api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(()),
            _ => Err(Error::MissingCredential(
                "Last.fm API key (use --lastfm-key or set LASTFM_API_KEY)",
            )),
        }
    }

    /// Photo source reading `photo`, copied into the capture dir when set.
    pub fn photo_source(&self, photo: &std::path::Path) -> FileSource {
        let source = FileSource::new(photo);
        match self.config.capture.capture_dir {
            Some(ref dir) => source.with_capture_dir(dir),
            None => source,
        }
    }

    pub fn readiness(&self) -> FileReadinessWaiter {
        FileReadinessWaiter::new(self.config.capture.readiness_policy())
    }

    pub fn orchestrator(&self, source: Arc<dyn PhotoSource>) -> PipelineOrchestrator {
        PipelineOrchestrator::new(
            source,
            self.recognition.clone(),
            self.resolver.clone(),
            self.aggregator.clone(),
        )
        .with_readiness(self.readiness())
        .with_quality(self.config.quality.gate())
        .with_crop(self.config.recognition.crop_box())
    }
}

fn build_engine(
    config: &RecognitionConfig,
    http_client: reqwest::Client,
) -> Result<Arc<dyn RecognitionEngine>> {
    match config.engine {
        EngineKind::Subprocess => Ok(Arc::new(SubprocessEngine::new(
            config.command.clone(),
            config.args.clone(),
            config.timeout(),
        ))),
        EngineKind::Remote => {
            let url = config
                .remote_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or(Error::Config(ConfigError::MissingRemoteUrl))?;
            Ok(Arc::new(RemoteEngine::new(http_client, url)))
        }
    }
}
