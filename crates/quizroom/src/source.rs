//! HTTP question provider.

use quizroom_protocol::Question;
use quizroom_room::{QuestionSource, SourceError};
use serde::Deserialize;

use crate::{ProviderConfig, QuizroomError};

/// Response body of the provider: `{"quizlist": [...]}`.
#[derive(Debug, Deserialize)]
struct QuizListBody {
    quizlist: Vec<Question>,
}

/// Fetches quizzes from a RapidAPI-style endpoint.
#[derive(Debug, Clone)]
pub struct HttpQuestionSource {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpQuestionSource {
    /// Builds the HTTP client with the configured request timeout.
    pub fn new(config: ProviderConfig) -> Result<Self, QuizroomError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// The request URL for a topic and difficulty.
    pub fn url_for(&self, area: &str, level: &str) -> String {
        self.config
            .url_template
            .replace("<area>", area)
            .replace("<level>", level)
    }
}

impl QuestionSource for HttpQuestionSource {
    async fn fetch(&self, area: &str, level: &str) -> Result<Vec<Question>, SourceError> {
        let mut request = self.client.get(self.url_for(area, level));
        if let Some(host) = &self.config.host {
            request = request.header("x-rapidapi-host", host);
        }
        if let Some(key) = &self.config.key {
            request = request.header("x-rapidapi-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: QuizListBody = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        tracing::debug!(area, level, questions = body.quizlist.len(), "quiz fetched");
        Ok(body.quizlist)
    }
}
