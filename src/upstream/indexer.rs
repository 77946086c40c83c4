use super::{UpstreamError, fetch_json};
use crate::models::ListingRecord;
use reqwest::Client;
use serde::Deserialize;

const SERVICE: &str = "indexer";

#[derive(Debug, Clone)]
pub struct IndexerClient {
    base_url: String,
    http: Client,
}

#[derive(Deserialize)]
struct ListingsEnvelope {
    items: Vec<ListingRecord>,
}

impl IndexerClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Current listing snapshot, in indexer order.
    pub async fn fetch_listings(&self) -> Result<Vec<ListingRecord>, UpstreamError> {
        let url = format!("{}/listings", self.base_url);
        let envelope: ListingsEnvelope = fetch_json(self.http.get(url), SERVICE).await?;
        Ok(envelope.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlan, MockUpstream, listing_json};
    use serde_json::json;

    #[tokio::test]
    async fn fetches_items_in_order() {
        let upstream = MockUpstream::spawn(MockPlan {
            listings: Some(json!({ "items": [listing_json(3, 1, "c3"), listing_json(1, 1, "c1")] })),
            ..MockPlan::default()
        })
        .await;
        let client = IndexerClient::new(upstream.base_url(), reqwest::Client::new());
        let items = client.fetch_listings().await.expect("listings");
        let ids: Vec<u64> = items.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn wrong_shape_is_a_decode_error() {
        let upstream = MockUpstream::spawn(MockPlan {
            listings: Some(json!([listing_json(1, 1, "c1")])),
            ..MockPlan::default()
        })
        .await;
        let client = IndexerClient::new(upstream.base_url(), reqwest::Client::new());
        let err = client.fetch_listings().await.expect_err("bare array");
        assert!(matches!(err, UpstreamError::Decode { service: "indexer", .. }));
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let upstream = MockUpstream::spawn(MockPlan::default()).await;
        let client = IndexerClient::new(upstream.base_url(), reqwest::Client::new());
        let err = client.fetch_listings().await.expect_err("no listings configured");
        assert_eq!(
            err,
            UpstreamError::Status {
                service: "indexer",
                status: 500
            }
        );
    }
}
