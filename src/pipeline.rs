use crate::config::StorefrontConfig;
use crate::http::build_client;
use crate::models::{EnrichedListing, ListingDetails, ListingRecord, ProfileRecord};
use crate::reservation::Reservation;
use crate::upstream::{
    ContractReader, IndexerClient, MetadataClient, PaymentLinkClient, ProfileClient, UpstreamError,
};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::{
    collections::{BTreeSet, HashMap},
    future::Future,
    time::Instant,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Aggregation and detail resolution over the marketplace collaborators.
///
/// Holds no per-request state; every call starts from fresh fetches.
#[derive(Clone)]
pub struct Storefront {
    indexer: IndexerClient,
    profiles: ProfileClient,
    metadata: MetadataClient,
    contract: ContractReader,
    payments: PaymentLinkClient,
}

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("listing source unavailable: {0}")]
    SourceUnavailable(#[source] UpstreamError),
    #[error("profile lookup failed: {0}")]
    ProfileLookupFailed(#[source] UpstreamError),
    #[error("metadata fetch failed: {0}")]
    MetadataFetchFailed(#[source] UpstreamError),
    #[error("invalid listing identifier `{0}`")]
    InvalidListingIdentifier(String),
    #[error("failed to fetch listing details: {0}")]
    ListingFetchFailed(#[source] UpstreamError),
    #[error("payment link generation failed: {0}")]
    PaymentLinkGenerationFailed(#[source] UpstreamError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorefrontErrorKind {
    InvalidInput,
    Upstream,
}

impl StorefrontError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::ProfileLookupFailed(_) => "profile_lookup_failed",
            Self::MetadataFetchFailed(_) => "metadata_fetch_failed",
            Self::InvalidListingIdentifier(_) => "invalid_listing_identifier",
            Self::ListingFetchFailed(_) => "listing_fetch_failed",
            Self::PaymentLinkGenerationFailed(_) => "payment_link_generation_failed",
        }
    }

    pub fn kind(&self) -> StorefrontErrorKind {
        match self {
            Self::InvalidListingIdentifier(_) => StorefrontErrorKind::InvalidInput,
            _ => StorefrontErrorKind::Upstream,
        }
    }
}

/// Placeholder image used when a listing's metadata cannot be fetched.
pub fn fallback_image_url(listing_id: u64) -> String {
    format!("https://picsum.photos/seed/{listing_id}/400/300")
}

/// Accepts only a non-empty run of ASCII digits that fits in `u64`.
pub fn parse_listing_id(raw: &str) -> Result<u64, StorefrontError> {
    let invalid = || StorefrontError::InvalidListingIdentifier(raw.to_string());
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse::<u64>().map_err(|_| invalid())
}

pub fn unique_fids(listings: &[ListingRecord]) -> BTreeSet<u64> {
    listings.iter().map(|listing| listing.fid).collect()
}

impl Storefront {
    pub fn new(config: &StorefrontConfig) -> Self {
        let http = build_client(&config.http);
        let endpoints = &config.endpoints;
        Self {
            indexer: IndexerClient::new(endpoints.indexer.clone(), http.clone()),
            profiles: ProfileClient::new(endpoints.profiles.clone(), http.clone()),
            metadata: MetadataClient::new(endpoints.ipfs_gateway.clone(), http.clone()),
            contract: ContractReader::new(endpoints.rpc.clone(), config.contract_address, http.clone()),
            payments: PaymentLinkClient::new(endpoints.payments.clone(), http),
        }
    }

    /// Fetches every listing and enriches it with seller profile and image.
    ///
    /// Only the listing source is fatal. A failed profile lookup leaves every
    /// profile absent; a failed metadata fetch swaps in the fallback image for
    /// that listing alone. Output order matches the indexer's order.
    pub async fn aggregate_listings(&self) -> Result<Vec<EnrichedListing>, StorefrontError> {
        let listings = timed("fetch_listings", self.indexer.fetch_listings())
            .await
            .map_err(StorefrontError::SourceUnavailable)?;

        let fids = unique_fids(&listings);
        let profiles = match timed("resolve_profiles", self.profiles.fetch_profiles(&fids)).await {
            Ok(profiles) => index_profiles(profiles),
            Err(err) => {
                let err = StorefrontError::ProfileLookupFailed(err);
                warn!(
                    target = "farbarter.pipeline",
                    fid_count = fids.len(),
                    error = %err,
                    "profile_lookup_degraded"
                );
                HashMap::new()
            }
        };

        let images = timed(
            "resolve_metadata",
            join_all(listings.iter().map(|listing| self.resolve_image(listing))),
        )
        .await;

        let enriched: Vec<EnrichedListing> = listings
            .into_iter()
            .zip(images)
            .map(|(listing, image_url)| {
                let seller_profile = profiles.get(&listing.fid).cloned();
                EnrichedListing {
                    listing,
                    image_url,
                    seller_profile,
                }
            })
            .collect();

        info!(
            target = "farbarter.pipeline",
            listings = enriched.len(),
            profiles = profiles.len(),
            "listings_enriched"
        );
        Ok(enriched)
    }

    async fn resolve_image(&self, listing: &ListingRecord) -> String {
        match self.metadata.fetch_metadata(&listing.metadata).await {
            Ok(document) => document.image_url,
            Err(err) => {
                let err = StorefrontError::MetadataFetchFailed(err);
                warn!(
                    target = "farbarter.pipeline",
                    listing_id = listing.id,
                    error = %err,
                    "metadata_fallback"
                );
                crate::metrics::metadata_fallback(listing.id);
                fallback_image_url(listing.id)
            }
        }
    }

    /// Reads one listing from the contract and joins its metadata document.
    ///
    /// The identifier is validated before any request is made. Unlike the
    /// list view, a metadata failure here is an error.
    pub async fn listing_details(&self, raw_id: &str) -> Result<ListingDetails, StorefrontError> {
        let listing_id = parse_listing_id(raw_id)?;
        let onchain = timed("read_contract", self.contract.read_listing(listing_id))
            .await
            .map_err(StorefrontError::ListingFetchFailed)?;
        let metadata = timed("resolve_metadata", self.metadata.fetch_metadata(&onchain.metadata))
            .await
            .map_err(StorefrontError::ListingFetchFailed)?;
        debug!(
            target = "farbarter.pipeline",
            listing_id,
            fid = onchain.fid,
            "listing_details_resolved"
        );

        Ok(ListingDetails {
            listing_id,
            seller: onchain.seller,
            fid: onchain.fid,
            price: onchain.price,
            remaining_supply: onchain.remaining_supply,
            metadata_pointer: onchain.metadata,
            metadata,
            is_active: onchain.is_active,
            total_sales: onchain.total_sales,
            preferred_token: onchain.preferred_token,
            preferred_chain: onchain.preferred_chain,
        })
    }

    /// Requests a payment link and wraps it in a reservation issued at `now`.
    pub async fn reserve(
        &self,
        raw_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Reservation, StorefrontError> {
        let listing_id = parse_listing_id(raw_id)?;
        let link = timed("generate_payment_link", self.payments.generate(listing_id))
            .await
            .map_err(StorefrontError::PaymentLinkGenerationFailed)?;
        let reservation = Reservation::issue(listing_id, link, now);
        info!(
            target = "farbarter.pipeline",
            listing_id,
            reservation_id = %reservation.id,
            expires_at = %reservation.expires_at,
            "reservation_issued"
        );
        Ok(reservation)
    }
}

/// First profile per fid wins.
fn index_profiles(profiles: Vec<ProfileRecord>) -> HashMap<u64, ProfileRecord> {
    let mut index = HashMap::with_capacity(profiles.len());
    for profile in profiles {
        index.entry(profile.fid).or_insert(profile);
    }
    index
}

async fn timed<T, Fut>(stage: &'static str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let started = Instant::now();
    let outcome = fut.await;
    crate::metrics::stage_elapsed(stage, started.elapsed().as_millis());
    outcome
}
