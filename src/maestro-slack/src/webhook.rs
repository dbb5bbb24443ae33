//! Incoming-webhook side channel.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use crate::error::{ActionError, ActionResult};
use crate::messages::SlashCommandResponse;

/// Posts formatted responses to a Slack incoming webhook.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: SecretString,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

impl WebhookNotifier {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: SecretString::from(url.into()),
        }
    }

    /// POST `response` as JSON to the webhook.
    pub async fn post(&self, response: &SlashCommandResponse) -> ActionResult<()> {
        debug!("Posting response to the webhook");

        let resp = self
            .client
            .post(self.url.expose_secret())
            .json(response)
            .send()
            .await
            .map_err(|e| ActionError::from(e.without_url()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!("Failed to post to the webhook: {} - {}", status, body);
            return Err(ActionError::Upstream(format!(
                "webhook returned {} - {}",
                status, body
            )));
        }

        debug!("Webhook post sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_sends_response_json() {
        let server = MockServer::start().await;
        let response = SlashCommandResponse::text("rory rolled 1 d1 and got 1").in_channel();

        Mock::given(method("POST"))
            .and(path("/services/T000/B000/XXXX"))
            .and(body_json(serde_json::json!({
                "text": "rory rolled 1 d1 and got 1",
                "response_type": "in_channel",
                "attachments": []
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(
            reqwest::Client::new(),
            format!("{}/services/T000/B000/XXXX", server.uri()),
        );
        notifier.post(&response).await.unwrap();
    }

    #[tokio::test]
    async fn test_post_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("invalid_token"))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(reqwest::Client::new(), server.uri());
        let err = notifier
            .post(&SlashCommandResponse::text("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Upstream(ref msg) if msg.contains("invalid_token")));
    }

    #[tokio::test]
    async fn test_send_failure_hides_url() {
        let notifier = WebhookNotifier::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/services/T000/B000/topsecret",
        );
        let err = notifier
            .post(&SlashCommandResponse::text("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ActionError::Network(_)));
        assert!(!err.to_string().contains("topsecret"));
    }

    #[test]
    fn test_debug_redacts_url() {
        let notifier = WebhookNotifier::new(
            reqwest::Client::new(),
            "https://hooks.slack.com/services/T000/B000/secret",
        );
        assert!(!format!("{:?}", notifier).contains("secret"));
    }
}
