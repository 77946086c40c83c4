use super::{UpstreamError, fetch_json};
use reqwest::{Client, Url};
use serde::Deserialize;

const SERVICE: &str = "payments";

#[derive(Debug, Clone)]
pub struct PaymentLinkClient {
    base_url: String,
    http: Client,
}

/// Payment-link payload across the service's historical shapes:
/// `{paymentUrl}`, `{paymentLink}`, `{url: {paymentLink | paymentUrl}}`,
/// `{url: "…"}`, and any of those wrapped in `{data: …}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkResponse {
    #[serde(default)]
    payment_url: Option<String>,
    #[serde(default)]
    payment_link: Option<String>,
    #[serde(default)]
    url: Option<LinkField>,
    #[serde(default)]
    data: Option<Box<PaymentLinkResponse>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LinkField {
    Direct(String),
    Nested {
        #[serde(default, rename = "paymentLink")]
        payment_link: Option<String>,
        #[serde(default, rename = "paymentUrl")]
        payment_url: Option<String>,
    },
}

impl LinkField {
    fn link(&self) -> Option<&str> {
        match self {
            LinkField::Direct(url) => non_empty(Some(url)),
            LinkField::Nested {
                payment_link,
                payment_url,
            } => non_empty(payment_link.as_ref()).or_else(|| non_empty(payment_url.as_ref())),
        }
    }
}

impl PaymentLinkResponse {
    /// First non-empty link in precedence order.
    pub fn payment_url(&self) -> Option<&str> {
        non_empty(self.payment_url.as_ref())
            .or_else(|| non_empty(self.payment_link.as_ref()))
            .or_else(|| self.url.as_ref().and_then(LinkField::link))
            .or_else(|| self.data.as_deref().and_then(PaymentLinkResponse::payment_url))
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl PaymentLinkClient {
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    /// Asks the service for a fresh payment link for `listing_id`.
    pub async fn generate(&self, listing_id: u64) -> Result<String, UpstreamError> {
        let url = format!("{}/generate-payment-link/{listing_id}", self.base_url);
        let payload: PaymentLinkResponse = fetch_json(self.http.get(url), SERVICE).await?;
        let link = payload
            .payment_url()
            .ok_or_else(|| UpstreamError::decode(SERVICE, "no payment link in response"))?;
        match Url::parse(link) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(link.to_string()),
            _ => Err(UpstreamError::decode(
                SERVICE,
                format!("unsupported payment link: {link}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlan, MockUpstream};
    use serde_json::{Value, json};

    fn link_of(value: Value) -> Option<String> {
        serde_json::from_value::<PaymentLinkResponse>(value)
            .expect("payload")
            .payment_url()
            .map(str::to_string)
    }

    #[test]
    fn accessor_walks_every_known_shape() {
        assert_eq!(link_of(json!({ "paymentUrl": "https://a" })).as_deref(), Some("https://a"));
        assert_eq!(link_of(json!({ "paymentLink": "https://b" })).as_deref(), Some("https://b"));
        assert_eq!(
            link_of(json!({ "url": { "paymentLink": "https://c" } })).as_deref(),
            Some("https://c")
        );
        assert_eq!(
            link_of(json!({ "url": { "paymentUrl": "https://d" } })).as_deref(),
            Some("https://d")
        );
        assert_eq!(link_of(json!({ "url": "https://e" })).as_deref(), Some("https://e"));
        assert_eq!(
            link_of(json!({ "data": { "url": { "paymentLink": "https://f" } } })).as_deref(),
            Some("https://f")
        );
    }

    #[test]
    fn accessor_prefers_top_level_and_skips_blanks() {
        assert_eq!(
            link_of(json!({ "paymentUrl": "", "url": { "paymentLink": "https://nested" } }))
                .as_deref(),
            Some("https://nested")
        );
        assert_eq!(
            link_of(json!({ "paymentUrl": "https://top", "data": { "paymentUrl": "https://inner" } }))
                .as_deref(),
            Some("https://top")
        );
        assert_eq!(link_of(json!({ "status": "ok" })), None);
    }

    #[tokio::test]
    async fn generate_returns_the_normalized_link() {
        let upstream = MockUpstream::spawn(MockPlan {
            payment: Some(json!({ "url": { "paymentLink": "https://pay.example/abc" } })),
            ..MockPlan::default()
        })
        .await;
        let client = PaymentLinkClient::new(upstream.base_url(), reqwest::Client::new());
        let link = client.generate(12).await.expect("link");
        assert_eq!(link, "https://pay.example/abc");
        assert_eq!(upstream.hits(), vec!["/generate-payment-link/12"]);
    }

    #[tokio::test]
    async fn generate_rejects_missing_or_non_http_links() {
        let upstream = MockUpstream::spawn(MockPlan {
            payment: Some(json!({ "paymentUrl": "javascript:alert(1)" })),
            ..MockPlan::default()
        })
        .await;
        let client = PaymentLinkClient::new(upstream.base_url(), reqwest::Client::new());
        let err = client.generate(1).await.expect_err("non-http link");
        assert!(matches!(err, UpstreamError::Decode { service: "payments", .. }));
    }
}
