use crate::contest::{
    model::{BookmarkRequest, Contest, Platform, SolutionRequest, SyncResponse},
    query::{ListQuery, ToQueryParameter},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

type Result<T> = std::result::Result<T, ContestApiError>;

#[derive(Debug, Error)]
pub enum ContestApiError {
    #[error("failed to request to contest service")]
    RequestError(#[from] reqwest::Error),
    #[error("failed to deserialize JSON data")]
    DeserializeError(#[from] serde_json::Error),
    #[error("invalid contest service url given")]
    InvalidUrlError(#[from] url::ParseError),
    #[error("contest service returned status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
}

/// Operations offered by the remote contest service.
///
/// List endpoints are filtered by platform on the service side. Mutations
/// return the authoritative contest record, which callers must use in place
/// of their local copy.
#[async_trait]
pub trait ContestApi: Send + Sync {
    async fn list_upcoming(&self, platforms: &BTreeSet<Platform>) -> Result<Vec<Contest>>;
    async fn list_past(&self, platforms: &BTreeSet<Platform>) -> Result<Vec<Contest>>;
    async fn set_bookmark(&self, contest_id: &str, desired: bool) -> Result<Contest>;
    /// Callers are expected to skip the call for a blank `url`.
    async fn set_solution_url(&self, contest_id: &str, url: &str) -> Result<Contest>;
    async fn sync(&self) -> Result<SyncResponse>;
}

pub struct HttpContestClient {
    base_url: Url,
    upcoming_url: Url,
    past_url: Url,
    sync_url: Url,
    client: Client,
}

impl HttpContestClient {
    pub fn new(api_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(api_url)?;
        // Url::join replaces the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let upcoming_url = base_url.join("contests/upcoming")?;
        let past_url = base_url.join("contests/past")?;
        let sync_url = base_url.join("contests/sync")?;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(HttpContestClient {
            base_url,
            upcoming_url,
            past_url,
            sync_url,
            client,
        })
    }

    fn contest_url(&self, contest_id: &str, action: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["contests", contest_id, action]);
        Ok(url)
    }

    async fn list(&self, url: &Url, platforms: &BTreeSet<Platform>) -> Result<Vec<Contest>> {
        let contests: Vec<Contest> = send_json(
            self.client
                .get(url.clone())
                .query(&ListQuery::new(platforms).to_query()),
        )
        .await?;
        tracing::debug!("{} contests received from {}", contests.len(), url);

        Ok(contests)
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let res: Response = request.send().await?;
    let status = res.status();
    if !status.is_success() {
        let message = res.text().await.unwrap_or_default();
        return Err(ContestApiError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        });
    }

    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl ContestApi for HttpContestClient {
    async fn list_upcoming(&self, platforms: &BTreeSet<Platform>) -> Result<Vec<Contest>> {
        self.list(&self.upcoming_url, platforms).await
    }

    async fn list_past(&self, platforms: &BTreeSet<Platform>) -> Result<Vec<Contest>> {
        self.list(&self.past_url, platforms).await
    }

    async fn set_bookmark(&self, contest_id: &str, desired: bool) -> Result<Contest> {
        let url = self.contest_url(contest_id, "bookmark")?;
        send_json(self.client.put(url).json(&BookmarkRequest {
            is_bookmarked: desired,
        }))
        .await
        .map_err(|e| {
            let action = if desired { "bookmark" } else { "unbookmark" };
            tracing::error!("failed to {} contest {}: {:?}", action, contest_id, e);
            e
        })
    }

    async fn set_solution_url(&self, contest_id: &str, url: &str) -> Result<Contest> {
        let endpoint = self.contest_url(contest_id, "solution")?;
        send_json(
            self.client
                .put(endpoint)
                .json(&SolutionRequest { solution_url: url }),
        )
        .await
        .map_err(|e| {
            tracing::error!("failed to update solution url of {}: {:?}", contest_id, e);
            e
        })
    }

    async fn sync(&self) -> Result<SyncResponse> {
        tracing::info!("Request contest synchronization");
        send_json(self.client.post(self.sync_url.clone()))
            .await
            .map_err(|e| {
                tracing::error!("failed to sync contests: {:?}", e);
                e
            })
    }
}
