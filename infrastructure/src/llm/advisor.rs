//! HTTP disambiguation advisor
//!
//! Calls an OpenAI-compatible chat-completions endpoint to pick among
//! lexically tied candidates. The model answers in JSON
//! (`{"id": "..."}` or `{"id": null}`); anything else counts as
//! declining, never as a pick.

use async_trait::async_trait;
use ecscope_application::ports::advisor::{AdvisorError, DisambiguationAdvisor};
use ecscope_domain::MatchCandidate;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct HttpAdvisorConfig {
    /// Base URL of the OpenAI-compatible API (no trailing slash)
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

pub struct HttpDisambiguationAdvisor {
    http: reqwest::Client,
    config: HttpAdvisorConfig,
}

impl HttpDisambiguationAdvisor {
    pub fn new(config: HttpAdvisorConfig) -> Result<Self, AdvisorError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdvisorError::RequestFailed(e.to_string()))?;
        Ok(Self { http, config })
    }
}

/// Prompt listing the candidates and the selection rules.
fn build_prompt(query: &str, candidates: &[MatchCandidate]) -> String {
    let mut prompt = format!(
        "A caller asked for the resource \"{query}\". Lexical matching found these candidates:\n\n"
    );
    for candidate in candidates {
        prompt.push_str(&format!(
            "- name: {}\n  id: {}\n  score: {:.3}\n",
            candidate.handle.display_name, candidate.handle.id, candidate.score
        ));
    }
    prompt.push_str(
        "\nPick the candidate the caller most likely means.\n\
         Rules:\n\
         1. Only answer with an id taken verbatim from the list above.\n\
         2. Avoid candidates whose names contain \"test\", \"dev\", \"sandbox\", \
         or \"experiment\" unless no other candidate fits.\n\
         3. If you cannot tell, answer null.\n\
         Reply with JSON: {\"id\": \"<candidate id>\"} or {\"id\": null}\n",
    );
    prompt
}

#[async_trait]
impl DisambiguationAdvisor for HttpDisambiguationAdvisor {
    async fn pick(
        &self,
        query: &str,
        candidates: &[MatchCandidate],
    ) -> Result<Option<String>, AdvisorError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You match container-orchestration resource names. Answer in JSON only."
                },
                { "role": "user", "content": build_prompt(query, candidates) }
            ],
            "temperature": 0.1,
            "max_tokens": 200,
            "response_format": { "type": "json_object" }
        });

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdvisorError::RequestFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdvisorError::RequestFailed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| AdvisorError::BadAnswer(e.to_string()))?;
        let content = envelope["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AdvisorError::BadAnswer("missing message content".to_string()))?;
        let answer: Value = serde_json::from_str(content)
            .map_err(|e| AdvisorError::BadAnswer(e.to_string()))?;

        let id = answer.get("id").and_then(Value::as_str).map(str::to_string);
        debug!(query, picked = ?id, "advisor answered");
        Ok(id)
    }
}
