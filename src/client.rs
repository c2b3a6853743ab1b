use crate::errors::ClientError;
use crate::models::{EntityKind, Exercise, HealthStatus, Session, SessionFilter};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

/// A record type served by one REST collection.
pub trait Resource: DeserializeOwned {
    const KIND: EntityKind;

    fn id(&self) -> i64;
}

impl Resource for Exercise {
    const KIND: EntityKind = EntityKind::Exercise;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Resource for Session {
    const KIND: EntityKind = EntityKind::Session;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Thin JSON wrapper over the `exercises` and `sessions` collections.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: String,
}

impl ResourceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.path())
    }

    fn record_url(&self, kind: EntityKind, id: i64) -> String {
        format!("{}/{}/{id}", self.base_url, kind.path())
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, ClientError> {
        let request = self.http.get(self.collection_url(R::KIND));
        self.fetch_list(request).await
    }

    /// Sessions matching the filter, newest first as the server orders them.
    pub async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>, ClientError> {
        let request = self
            .http
            .get(self.collection_url(EntityKind::Session))
            .query(filter);
        self.fetch_list(request).await
    }

    async fn fetch_list<R: Resource>(&self, request: RequestBuilder) -> Result<Vec<R>, ClientError> {
        debug!(kind = %R::KIND, "listing collection");
        let records: Vec<R> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(kind = %R::KIND, count = records.len(), "collection fetched");
        Ok(records)
    }

    pub async fn get<R: Resource>(&self, id: i64) -> Result<R, ClientError> {
        let response = self.http.get(self.record_url(R::KIND, id)).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(kind = %R::KIND, id, %status, "record fetch failed");
            return Err(ClientError::NotFound {
                kind: R::KIND,
                id,
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    pub async fn create<R, P>(&self, payload: &P) -> Result<R, ClientError>
    where
        R: Resource,
        P: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.collection_url(R::KIND))
            .json(payload)
            .send()
            .await?;
        let created: R = read_mutation(response).await?;
        info!(kind = %R::KIND, id = created.id(), "record created");
        Ok(created)
    }

    pub async fn update<R, P>(&self, id: i64, patch: &P) -> Result<R, ClientError>
    where
        R: Resource,
        P: Serialize + ?Sized,
    {
        let response = self
            .http
            .put(self.record_url(R::KIND, id))
            .json(patch)
            .send()
            .await?;
        let updated: R = read_mutation(response).await?;
        info!(kind = %R::KIND, id, "record updated");
        Ok(updated)
    }

    /// Deletes a record. Only an explicit 204 counts as success.
    pub async fn remove(&self, kind: EntityKind, id: i64) -> Result<(), ClientError> {
        let response = self.http.delete(self.record_url(kind, id)).send().await?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            warn!(%kind, id, %status, "delete rejected");
            return Err(ClientError::Delete {
                status: status.as_u16(),
            });
        }
        info!(%kind, id, "record deleted");
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.base_url);
        Ok(self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

async fn read_mutation<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await?;
        warn!(%status, "mutation rejected: {text}");
        return Err(ClientError::Validation(text));
    }
    Ok(response.json().await?)
}
