use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier responded with HTTP {0}")]
    Status(u16),

    #[error("classifier response is not JSON: {0}")]
    Decode(String),
}

/// A text-classification model that scores every emotion it knows.
///
/// Implementations return the model output untouched. The expected shape is
/// one outer list holding a list of `{"label": .., "score": ..}` objects, but
/// callers must tolerate anything else (see [`super::normalize`]).
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Value, ClassificationError>;
}

/// Talks to a Hugging Face style inference endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmotionClassifier {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpEmotionClassifier {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClassificationError> {
        Self::new(
            config.classifier_url.clone(),
            config.classifier_token.clone(),
            Duration::from_secs(config.classifier_timeout_secs),
        )
    }
}

#[async_trait]
impl EmotionClassifier for HttpEmotionClassifier {
    async fn classify(&self, text: &str) -> Result<Value, ClassificationError> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "inputs": text }));

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(url = %self.url, error = %e, "Emotion classifier unreachable");
            ClassificationError::Transport(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                url    = %self.url,
                status = status.as_u16(),
                "Emotion classifier returned an error status"
            );
            return Err(ClassificationError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClassificationError::Decode(e.to_string()))
    }
}
