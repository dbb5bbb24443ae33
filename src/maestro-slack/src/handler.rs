//! Request handling: raw body in, status and body out.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::actions::build_action;
use crate::commands::route;
use crate::config::MaestroConfig;
use crate::error::{ActionError, ActionResult, ErrorKind};
use crate::messages::SlashCommandResponse;
use crate::payload::{CommandEnvelope, decode};
use crate::sources::{SpellSource, build_source};
use crate::webhook::WebhookNotifier;

/// Body returned for service errors; details stay in the logs.
pub const SERVICE_ERROR_BODY: &str = "service error";

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// What the HTTP layer should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub body: String,
    pub content_type: &'static str,
}

impl HandlerResponse {
    fn json(body: String) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            content_type: CONTENT_TYPE_JSON,
        }
    }

    fn from_error(err: &ActionError) -> Self {
        match err.kind() {
            ErrorKind::User => Self {
                status: StatusCode::OK,
                body: err.to_string(),
                content_type: CONTENT_TYPE_TEXT,
            },
            ErrorKind::Service => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: SERVICE_ERROR_BODY.to_string(),
                content_type: CONTENT_TYPE_TEXT,
            },
        }
    }
}

/// Runs slash commands end to end.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    source: Arc<dyn SpellSource>,
    notifier: Option<WebhookNotifier>,
}

impl CommandHandler {
    /// Build a handler with a shared HTTP client for the configured source
    /// and webhook.
    pub fn new(config: &MaestroConfig) -> ActionResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| ActionError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let source = build_source(config, client.clone());
        let notifier = config
            .webhook_url()
            .map(|url| WebhookNotifier::new(client, url));

        debug!(
            "Command handler ready: format={:?} endpoint={} webhook={}",
            config.spell_format(),
            config.spell_endpoint(),
            notifier.is_some()
        );

        Ok(Self { source, notifier })
    }

    /// Replace the spell source.
    pub fn with_source(mut self, source: Arc<dyn SpellSource>) -> Self {
        self.source = source;
        self
    }

    /// Mirror successful responses to a webhook.
    pub fn with_notifier(mut self, notifier: WebhookNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Stop mirroring responses; used when running commands locally.
    pub fn without_notifier(mut self) -> Self {
        self.notifier = None;
        self
    }

    /// Route and run an already decoded command.
    pub async fn execute(&self, envelope: &CommandEnvelope) -> ActionResult<SlashCommandResponse> {
        let kind = route(&envelope.command)?;
        let action = build_action(kind, envelope, &self.source)?;
        debug!("Running {:?} for user '{}'", action.kind(), envelope.invoking_user);

        let response = action.process().await?;

        if let Some(notifier) = &self.notifier
            && let Err(e) = notifier.post(&response).await
        {
            warn!("Failed to mirror response to the webhook: {}", e);
        }

        Ok(response)
    }

    /// Decode, route, run and serialize.
    pub async fn run(&self, body: &str, is_base64: bool) -> ActionResult<String> {
        let envelope = decode(body, is_base64)?;
        let response = self.execute(&envelope).await?;
        response.to_json()
    }

    /// Like [`Self::run`], but folds errors into a status and body.
    pub async fn handle(&self, body: &str, is_base64: bool) -> HandlerResponse {
        match self.run(body, is_base64).await {
            Ok(json) => {
                info!("Command handled successfully");
                HandlerResponse::json(json)
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::User => info!("Rejected command: {}", e),
                    ErrorKind::Service => error!("Failed to handle command: {}", e),
                }
                HandlerResponse::from_error(&e)
            }
        }
    }
}
