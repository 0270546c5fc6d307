//! Chat command - forward a message to the Gemini generative API.

use std::time::{Duration, Instant};

use clap::Args;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use billscan_core::models::config::ChatConfig;

use super::config::load_config;

/// Reply printed whenever the assistant cannot be reached.
pub const FALLBACK_REPLY: &str =
    "I apologize, but I encountered an error. Please try again later.";

/// Arguments for the chat command.
#[derive(Args)]
pub struct ChatArgs {
    /// Message to send
    #[arg(required = true, num_args = 1..)]
    message: Vec<String>,
}

pub async fn run(args: ChatArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let message = args.message.join(" ");

    let reply = match ask(&config.chat, &message).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Chat request failed: {:#}", e);
            FALLBACK_REPLY.to_string()
        }
    };

    println!("{}", reply);

    Ok(())
}

async fn ask(config: &ChatConfig, message: &str) -> anyhow::Result<String> {
    let client = GeminiClient::from_config(config)?;
    client.generate(message).await
}

/// Minimal client for the `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client, reading the API key from the configured environment variable.
    pub fn from_config(config: &ChatConfig) -> anyhow::Result<Self> {
        let api_key = match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => anyhow::bail!("{} is not set", config.api_key_env),
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    pub async fn generate(&self, message: &str) -> anyhow::Result<String> {
        let start = Instant::now();
        info!("Sending chat message to {}", self.model);

        // API key goes in the query string
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&request_body(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API returned {}: {}", status, body);
        }

        let body: Value = response.json().await?;
        debug!("Chat reply received in {:?}", start.elapsed());

        extract_reply(&body).ok_or_else(|| anyhow::anyhow!("response has no candidate text"))
    }
}

fn request_body(message: &str) -> Value {
    json!({
        "contents": [
            {
                "parts": [
                    { "text": message }
                ]
            }
        ]
    })
}

/// Text of the first part of the first candidate.
fn extract_reply(body: &Value) -> Option<String> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_body() {
        assert_eq!(
            request_body("hello"),
            json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_extract_reply() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "Hi there"}, {"text": "ignored"}], "role": "model"}}
            ]
        });
        assert_eq!(extract_reply(&body), Some("Hi there".to_string()));
    }

    #[test]
    fn test_extract_reply_malformed() {
        assert_eq!(extract_reply(&json!({"candidates": []})), None);
        assert_eq!(extract_reply(&json!({"error": {"code": 400}})), None);
        assert_eq!(
            extract_reply(&json!({"candidates": [{"content": {"parts": [{"text": 5}]}}]})),
            None
        );
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = ChatConfig {
            api_key_env: "BILLSCAN_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ChatConfig::default()
        };
        assert!(GeminiClient::from_config(&config).is_err());
    }
}
