use super::{UpstreamError, fetch_json};
use crate::models::ProfileRecord;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;

const SERVICE: &str = "profiles";

#[derive(Debug, Clone)]
pub struct ProfileClient {
    base_url: String,
    http: Client,
}

#[derive(Deserialize)]
struct BulkUsersEnvelope {
    users: Vec<ProfileRecord>,
}

impl ProfileClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// One batched lookup. The service may answer with a subset of `fids`.
    pub async fn fetch_profiles(
        &self,
        fids: &BTreeSet<u64>,
    ) -> Result<Vec<ProfileRecord>, UpstreamError> {
        if fids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = fids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/user/bulk?fids={joined}", self.base_url);
        let envelope: BulkUsersEnvelope = fetch_json(self.http.get(url), SERVICE).await?;
        Ok(envelope.users)
    }
}
