//! Slash command payload decoding.
//!
//! Slack delivers slash commands as an `application/x-www-form-urlencoded`
//! body, for example:
//!
//! ```text
//! token=abc&team_id=T1&user_name=rory&command=%2Froll&text=3+d6&response_url=https%3A%2F%2F...
//! ```
//!
//! The body can additionally be base64 wrapped by the gateway in front of us.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::error::{ActionError, ActionResult};

/// Typed view of the slash command fields the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEnvelope {
    /// Bare command word, e.g. `roll` or `spell`.
    pub command: String,
    /// Argument text with the platform's `+` separators preserved.
    pub argument_text: String,
    /// Name of the user who invoked the command.
    pub invoking_user: String,
}

/// Decode a raw request body into a [`CommandEnvelope`].
///
/// Missing `command`, `text` or `user_name` keys decode to empty strings;
/// unknown keys are ignored.
pub fn decode(raw: &str, is_base64: bool) -> ActionResult<CommandEnvelope> {
    if raw.is_empty() {
        return Err(ActionError::Decode(
            "empty request body not expected".to_string(),
        ));
    }

    let body = if is_base64 {
        let bytes = STANDARD
            .decode(raw.trim())
            .map_err(|e| ActionError::Decode(format!("request body is not valid base64: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|_| ActionError::Decode("request body is not valid UTF-8".to_string()))?
    } else {
        raw.to_string()
    };

    if body.is_empty() {
        return Err(ActionError::Decode(
            "empty request body not expected".to_string(),
        ));
    }

    let fields = parse_form(&body)?;
    let take = |key: &str| fields.get(key).cloned().unwrap_or_default();

    let raw_command = take("command");
    let command = raw_command
        .strip_prefix('/')
        .unwrap_or(&raw_command)
        .to_string();

    let envelope = CommandEnvelope {
        command,
        argument_text: take("text"),
        invoking_user: take("user_name"),
    };
    debug!(
        command = %envelope.command,
        user = %envelope.invoking_user,
        "Decoded slash command payload"
    );
    Ok(envelope)
}

/// Split `key=value&key=value` into a map, percent-decoding every value.
///
/// `+` is left untouched: the argument parsers treat it as the word
/// separator. A key without `=` maps to an empty value; later duplicates win.
fn parse_form(body: &str) -> ActionResult<HashMap<String, String>> {
    let mut fields = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map_err(|_| ActionError::Decode(format!("value for '{}' is not valid UTF-8", key)))?;
        fields.insert(key.to_string(), value.into_owned());
    }
    Ok(fields)
}
