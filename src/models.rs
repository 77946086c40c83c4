use crate::price::UsdcAmount;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, DisplayFromStr, PickFirst, serde_as, skip_serializing_none};

/// Listing snapshot as mirrored by the indexer.
///
/// Integer fields accept JSON numbers or base-10 strings since indexers
/// commonly serialize big integers as text.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: u64,
    pub seller: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub fid: u64,
    pub price: UsdcAmount,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub remaining_supply: u64,
    /// Content-addressed pointer to the listing's metadata document.
    pub metadata: String,
    pub is_active: bool,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub total_sales: u64,
}

/// Display fields treat JSON `null` like a missing key.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub fid: u64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub username: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "display_name")]
    pub display_name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, alias = "pfp_url")]
    pub pfp: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub description: String,
    /// The only required field.
    #[serde(alias = "image")]
    pub image_url: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub location: String,
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    pub supply: u64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub is_online: bool,
    /// Informational only; the on-chain price is authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub image_url: String,
    pub seller_profile: Option<ProfileRecord>,
}

impl EnrichedListing {
    pub fn seller_handle(&self) -> &str {
        self.seller_profile
            .as_ref()
            .map(|profile| profile.username.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("unknown")
    }
}

/// Listing as read from the contract, joined with its metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetails {
    pub listing_id: u64,
    pub seller: Address,
    pub fid: u64,
    pub price: UsdcAmount,
    pub remaining_supply: u64,
    pub metadata_pointer: String,
    pub metadata: MetadataDocument,
    pub is_active: bool,
    pub total_sales: u64,
    pub preferred_token: String,
    pub preferred_chain: u64,
}

#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub items: Vec<EnrichedListing>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
