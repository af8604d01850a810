use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder, Response};

use crate::api::handlers::{
    AdjustCountRequest, AdjustCountResponse, CountsResponse, SubmissionRequest,
    SubmissionResponse,
};
use crate::api::visitor_extractor::SESSION_HEADER;
use crate::config::ClientConfig;
use crate::model::{ArtworkId, EmotionCounts, EmotionSet, Submission, VisitorKey};
use crate::store::traits::{CountStore, SubmissionStore};

/// Vote store reached through the emotion API. The server derives the
/// visitor's network address itself; only the session token travels with
/// each request.
#[derive(Debug, Clone)]
pub struct HttpVoteStore {
    client: Client,
    base_url: String,
}

impl HttpVoteStore {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn counts_url(&self, artwork_id: ArtworkId) -> String {
        format!("{}/emotions/{}", self.base_url, artwork_id)
    }

    fn submission_url(&self, artwork_id: ArtworkId) -> String {
        format!("{}/emotions/{}/submission", self.base_url, artwork_id)
    }

    async fn send(request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to {}", what))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Failed to {}: {} {}", what, status, body));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl CountStore for HttpVoteStore {
    async fn get_counts(&self, artwork_id: ArtworkId) -> Result<EmotionCounts> {
        let response = Self::send(
            self.client.get(self.counts_url(artwork_id)),
            "fetch emotion counts",
        )
        .await?;
        let body: CountsResponse = response
            .json()
            .await
            .context("Malformed emotion counts response")?;
        Ok(body.counts)
    }

    async fn adjust_count(&self, artwork_id: ArtworkId, emotion: &str, delta: i64) -> Result<i64> {
        let request = AdjustCountRequest {
            emotion: Some(emotion.to_string()),
            delta: Some(delta),
        };
        let response = Self::send(
            self.client.post(self.counts_url(artwork_id)).json(&request),
            "update emotion count",
        )
        .await?;
        let body: AdjustCountResponse = response
            .json()
            .await
            .context("Malformed emotion count response")?;
        Ok(body.new_count)
    }
}

#[async_trait::async_trait]
impl SubmissionStore for HttpVoteStore {
    async fn get_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
    ) -> Result<Option<Submission>> {
        let response = Self::send(
            self.client
                .get(self.submission_url(artwork_id))
                .header(SESSION_HEADER, &visitor.session_id),
            "check submission",
        )
        .await?;
        let body: SubmissionResponse = response
            .json()
            .await
            .context("Malformed submission response")?;

        if !body.has_submitted {
            return Ok(None);
        }
        Ok(Some(Submission::new(
            artwork_id,
            visitor.clone(),
            body.previous_emotions,
        )))
    }

    async fn put_submission(
        &self,
        artwork_id: ArtworkId,
        visitor: &VisitorKey,
        emotions: &EmotionSet,
    ) -> Result<()> {
        let request = SubmissionRequest {
            selected_emotions: Some(emotions.iter().cloned().collect()),
        };
        Self::send(
            self.client
                .post(self.submission_url(artwork_id))
                .header(SESSION_HEADER, &visitor.session_id)
                .json(&request),
            "save submission",
        )
        .await?;
        Ok(())
    }
}
