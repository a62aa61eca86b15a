use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tracing::info;
use urbano_core::config::{AppConfig, ConfigError};
use urbano_core::DictionaryClient;
use urbano_dictionary::{ClientBuildError, UrbanDictionaryApi};

use crate::health::{self, HealthState};
use crate::routes::{self, CommandState, HandlerSettings};

pub struct Application {
    pub config: AppConfig,
    pub dictionary: DictionaryClient,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("dictionary client setup failed: {0}")]
    UpstreamClient(#[from] ClientBuildError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        signature_check = config.slack.signing_secret.is_some(),
        token_check = config.slack.verification_token.is_some(),
        "starting application bootstrap"
    );
    let upstream = UrbanDictionaryApi::new(&config.upstream)?;
    info!(
        event_name = "system.bootstrap.upstream_ready",
        correlation_id = "bootstrap",
        define_url = %upstream.define_url(),
        random_url = %upstream.random_url(),
        timeout_secs = config.upstream.timeout_secs,
        "dictionary upstream client configured"
    );

    let dictionary = DictionaryClient::new(Arc::new(upstream), config.random.policy());
    info!(
        event_name = "system.bootstrap.random_policy",
        correlation_id = "bootstrap",
        threshold = config.random.threshold,
        max_retries = config.random.max_retries,
        "random word policy loaded"
    );

    Ok(Application { config, dictionary })
}

impl Application {
    pub fn handler_settings(&self) -> HandlerSettings {
        HandlerSettings {
            bot_version: self.config.bot.version.clone(),
            empty_text_reply: self.config.bot.empty_text_reply.clone(),
            signing_secret: self.config.slack.signing_secret.clone(),
            verification_token: self.config.slack.verification_token.clone(),
            request_timeout: Duration::from_secs(self.config.server.request_timeout_secs),
        }
    }

    pub fn router(&self) -> Router {
        let commands = CommandState::new(self.dictionary.clone(), self.handler_settings());
        let health = HealthState::new(&self.config.upstream.base_url, &self.config.bot.version);

        routes::router(commands).merge(health::router(health))
    }
}
