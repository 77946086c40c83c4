use super::{UpstreamError, fetch_json};
use crate::models::MetadataDocument;
use reqwest::Client;
use urlencoding::encode;

const SERVICE: &str = "ipfs";

#[derive(Debug, Clone)]
pub struct MetadataClient {
    gateway_url: String,
    http: Client,
}

impl MetadataClient {
    pub fn new(gateway_url: impl Into<String>, http: Client) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            http,
        }
    }

    pub async fn fetch_metadata(&self, pointer: &str) -> Result<MetadataDocument, UpstreamError> {
        let pointer = normalize_pointer(pointer)
            .ok_or_else(|| UpstreamError::request(SERVICE, "empty content pointer"))?;
        let url = format!("{}/ipfs/{}", self.gateway_url, encode_path(pointer));
        fetch_json(self.http.get(url), SERVICE).await
    }
}

/// Strips an `ipfs://` scheme and surrounding slashes.
fn normalize_pointer(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix("ipfs://").unwrap_or(trimmed);
    let bare = bare.trim_matches('/');
    (!bare.is_empty()).then_some(bare)
}

/// Percent-encodes each segment of a `cid/sub/path` pointer, keeping the slashes.
fn encode_path(pointer: &str) -> String {
    pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlan, MockUpstream, metadata_json};

    #[test]
    fn pointer_normalization() {
        assert_eq!(normalize_pointer("ipfs://bafyabc"), Some("bafyabc"));
        assert_eq!(normalize_pointer(" Qm123 "), Some("Qm123"));
        assert_eq!(normalize_pointer("ipfs://"), None);
        assert_eq!(normalize_pointer(""), None);
    }

    #[tokio::test]
    async fn fetches_document_by_pointer() {
        let upstream = MockUpstream::spawn(MockPlan {
            metadata: [("cidA".to_string(), metadata_json("X"))].into(),
            ..MockPlan::default()
        })
        .await;
        let client = MetadataClient::new(upstream.base_url(), reqwest::Client::new());
        let doc = client.fetch_metadata("ipfs://cidA").await.expect("doc");
        assert_eq!(doc.image_url, "X");
        assert_eq!(upstream.hits(), vec!["/ipfs/cidA"]);
    }

    #[test]
    fn path_pointers_keep_their_separators() {
        assert_eq!(encode_path("bafyabc/metadata.json"), "bafyabc/metadata.json");
        assert_eq!(encode_path("bafyabc/my file.json"), "bafyabc/my%20file.json");
        assert_eq!(encode_path("bafyabc//a"), "bafyabc/a");
    }

    #[tokio::test]
    async fn fetches_document_under_directory_pointer() {
        let upstream = MockUpstream::spawn(MockPlan {
            metadata: [("bafydir/metadata.json".to_string(), metadata_json("Y"))].into(),
            ..MockPlan::default()
        })
        .await;
        let client = MetadataClient::new(upstream.base_url(), reqwest::Client::new());
        let doc = client
            .fetch_metadata("ipfs://bafydir/metadata.json")
            .await
            .expect("doc");
        assert_eq!(doc.image_url, "Y");
        assert_eq!(upstream.hits(), vec!["/ipfs/bafydir/metadata.json"]);
    }

    #[tokio::test]
    async fn empty_pointer_fails_without_a_request() {
        let upstream = MockUpstream::spawn(MockPlan::default()).await;
        let client = MetadataClient::new(upstream.base_url(), reqwest::Client::new());
        let err = client.fetch_metadata("  ").await.expect_err("empty");
        assert_eq!(err.service(), "ipfs");
        assert!(upstream.hits().is_empty());
    }
}
