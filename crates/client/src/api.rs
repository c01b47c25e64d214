//! Typed API surface and its HTTP implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{ClientError, ErrorBody};
use crate::types::{Piece, PieceDraft, PieceUpdate, PieceWithStages, Stage, StageDetailUpdate};

/// Piece operations exposed by the backend.
///
/// The store depends on this trait rather than on `reqwest` so mutations can
/// be tested against a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PiecesApi: Send + Sync {
    /// Create a piece; the server answers with its six stage entries.
    async fn create(&self, draft: &PieceDraft) -> Result<PieceWithStages, ClientError>;

    /// List an owner's pieces, newest first.
    async fn list(
        &self,
        owner_id: &Uuid,
        include_archived: bool,
    ) -> Result<Vec<Piece>, ClientError>;

    /// Fetch one piece with its stage entries.
    async fn fetch(&self, id: &Uuid) -> Result<PieceWithStages, ClientError>;

    /// Apply a partial update and return the server's copy.
    async fn update(&self, id: &Uuid, update: &PieceUpdate) -> Result<Piece, ClientError>;

    /// Delete a piece and its stage entries.
    async fn delete(&self, id: &Uuid) -> Result<(), ClientError>;

    /// Update one stage entry of a piece.
    async fn update_stage_detail(
        &self,
        id: &Uuid,
        stage: Stage,
        update: &StageDetailUpdate,
    ) -> Result<(), ClientError>;
}

/// `reqwest`-backed implementation of [`PiecesApi`].
#[derive(Clone)]
pub struct HttpPiecesApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPiecesApi {
    /// Build a client against the given base URL (scheme and host, no path).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Build around an existing `reqwest` client, e.g. one with custom TLS.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }
}

fn list_query(owner_id: &Uuid, include_archived: bool) -> Vec<(&'static str, String)> {
    let mut query = vec![("ownerId", owner_id.to_string())];
    if include_archived {
        query.push(("includeArchived", "true".to_owned()));
    }
    query
}

/// Pass successful responses through; turn the rest into [`ClientError`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.json::<ErrorBody>().await.ok();
    Err(ClientError::from_status(status, body))
}

#[async_trait]
impl PiecesApi for HttpPiecesApi {
    async fn create(&self, draft: &PieceDraft) -> Result<PieceWithStages, ClientError> {
        let response = self
            .client
            .post(self.url("pieces"))
            .json(draft)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn list(
        &self,
        owner_id: &Uuid,
        include_archived: bool,
    ) -> Result<Vec<Piece>, ClientError> {
        let response = self
            .client
            .get(self.url("pieces"))
            .query(&list_query(owner_id, include_archived))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn fetch(&self, id: &Uuid) -> Result<PieceWithStages, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("pieces/{id}")))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(&self, id: &Uuid, update: &PieceUpdate) -> Result<Piece, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("pieces/{id}")))
            .json(update)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("pieces/{id}")))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn update_stage_detail(
        &self,
        id: &Uuid,
        stage: Stage,
        update: &StageDetailUpdate,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.url(&format!("pieces/{id}/stages/{}", stage.as_str())))
            .json(update)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
