//! Chat-history client for an AnythingLLM instance. It reports why text was
//! unavailable; what the text contains is the parser's problem.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Deserialize;

use crate::config::AnythingLlmConfig;

/// Replies containing this marker are the assistant refusing to export the
/// chat and never become documents.
const EXPORT_REFUSAL_MARKER: &str = "unable to directly export";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HistoryMessage {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct HistoryResponse {
    history: Vec<HistoryMessage>,
}

#[derive(Clone)]
pub struct HistoryClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HistoryClient {
    pub fn new(config: &AnythingLlmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Whether the client has the credentials it needs to talk upstream.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.api_key.is_empty()
    }

    /// Fetch the chat history and return the newest exportable assistant
    /// reply, or `None` when the chat has no usable one.
    pub async fn last_exportable_reply(
        &self,
        workspace_slug: &str,
        chat_id: &str,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/api/v1/workspace/{workspace_slug}/chat/{chat_id}/history",
            self.base_url
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("request chat history")?;
        let status = response.status();
        if !status.is_success() {
            bail!("chat history request returned {status}");
        }
        let history: HistoryResponse = response.json().await.context("decode chat history")?;
        Ok(pick_reply(&history.history).map(str::to_string))
    }
}

/// Newest-first scan for an assistant message that is not an export refusal.
/// An empty reply counts as missing, not as an empty document.
fn pick_reply(history: &[HistoryMessage]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|message| {
            message.role == "assistant"
                && !message.text.to_lowercase().contains(EXPORT_REFUSAL_MARKER)
        })
        .map(|message| message.text.as_str())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: &str, text: &str) -> HistoryMessage {
        HistoryMessage {
            role: role.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn picks_the_newest_assistant_reply() {
        let history = vec![
            message("assistant", "old"),
            message("user", "question"),
            message("assistant", "new"),
        ];
        assert_eq!(pick_reply(&history), Some("new"));
    }

    #[test]
    fn skips_export_refusals() {
        let history = vec![
            message("assistant", "# The actual SOW"),
            message("assistant", "I am Unable to Directly Export this chat."),
        ];
        assert_eq!(pick_reply(&history), Some("# The actual SOW"));
    }

    #[test]
    fn ignores_user_messages() {
        let history = vec![message("user", "hello")];
        assert_eq!(pick_reply(&history), None);
    }

    #[test]
    fn empty_history_has_no_reply() {
        assert_eq!(pick_reply(&[]), None);
    }

    #[test]
    fn an_empty_reply_counts_as_missing() {
        let history = vec![message("assistant", "")];
        assert_eq!(pick_reply(&history), None);
    }

    #[test]
    fn history_response_tolerates_missing_fields() {
        let decoded: HistoryResponse =
            serde_json::from_str(r#"{"history":[{"role":"assistant"}]}"#).unwrap();
        assert_eq!(decoded.history.len(), 1);
        assert_eq!(decoded.history[0].text, "");
    }
}
