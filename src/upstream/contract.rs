//! Read-only access to the marketplace contract over JSON-RPC `eth_call`.

use super::{UpstreamError, fetch_json};
use crate::price::UsdcAmount;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, sol};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SERVICE: &str = "contract";

sol! {
    function getListingDetails(uint256 listingId) external view returns (
        address seller,
        uint256 fid,
        uint256 price,
        uint256 remainingSupply,
        string metadata,
        bool isActive,
        uint256 totalSales,
        string preferredToken,
        uint256 preferredChain
    );
}

#[derive(Debug, Clone)]
pub struct ContractReader {
    rpc_url: String,
    address: Address,
    http: Client,
}

/// Decoded `getListingDetails` return tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractListing {
    pub seller: Address,
    pub fid: u64,
    pub price: UsdcAmount,
    pub remaining_supply: u64,
    pub metadata: String,
    pub is_active: bool,
    pub total_sales: u64,
    pub preferred_token: String,
    pub preferred_chain: u64,
}

#[derive(Debug, Error)]
pub enum ReturnDecodeError {
    #[error(transparent)]
    Abi(#[from] alloy_sol_types::Error),
    #[error("`{0}` does not fit the listing field")]
    OutOfRange(&'static str),
}

#[derive(Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallParams, &'static str),
}

#[derive(Serialize)]
struct CallParams {
    to: Address,
    data: Bytes,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Bytes>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl ContractReader {
    pub fn new(rpc_url: impl Into<String>, address: Address, http: Client) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            address,
            http,
        }
    }

    pub async fn read_listing(&self, listing_id: u64) -> Result<ContractListing, UpstreamError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (
                CallParams {
                    to: self.address,
                    data: encode_get_listing_details(listing_id),
                },
                "latest",
            ),
        };
        let response: RpcResponse =
            fetch_json(self.http.post(&self.rpc_url).json(&body), SERVICE).await?;
        if let Some(err) = response.error {
            return Err(UpstreamError::request(
                SERVICE,
                format!("rpc error {}: {}", err.code, err.message),
            ));
        }
        let result = response
            .result
            .ok_or_else(|| UpstreamError::decode(SERVICE, "missing result"))?;
        decode_listing_details(&result).map_err(|err| UpstreamError::decode(SERVICE, err.to_string()))
    }
}

pub fn encode_get_listing_details(listing_id: u64) -> Bytes {
    getListingDetailsCall {
        listingId: U256::from(listing_id),
    }
    .abi_encode()
    .into()
}

pub fn decode_listing_details(data: &[u8]) -> Result<ContractListing, ReturnDecodeError> {
    let ret = getListingDetailsCall::abi_decode_returns(data)?;
    Ok(ContractListing {
        seller: ret.seller,
        fid: narrow(ret.fid, "fid")?,
        price: UsdcAmount::from_units(
            u128::try_from(ret.price).map_err(|_| ReturnDecodeError::OutOfRange("price"))?,
        ),
        remaining_supply: narrow(ret.remainingSupply, "remainingSupply")?,
        metadata: ret.metadata,
        is_active: ret.isActive,
        total_sales: narrow(ret.totalSales, "totalSales")?,
        preferred_token: ret.preferredToken,
        preferred_chain: narrow(ret.preferredChain, "preferredChain")?,
    })
}

fn narrow(value: U256, field: &'static str) -> Result<u64, ReturnDecodeError> {
    u64::try_from(value).map_err(|_| ReturnDecodeError::OutOfRange(field))
}
