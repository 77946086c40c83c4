use crate::models::ListingDetails;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A payment link stays on offer for this long after issuance.
pub const RESERVATION_WINDOW_SECS: i64 = 5 * 60;

/// A time-boxed payment link for one purchase attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub listing_id: u64,
    pub payment_url: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Reservation {
    pub fn issue(listing_id: u64, payment_url: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            payment_url,
            issued_at: now,
            expires_at: now + Duration::seconds(RESERVATION_WINDOW_SECS),
        }
    }

    /// Valid on `[issued_at, expires_at)`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.issued_at && now < self.expires_at
    }

    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        if !self.is_active_at(now) {
            return 0;
        }
        let remaining = self.expires_at - now;
        // round up so a page refresh never lands before expiry
        let millis = remaining.num_milliseconds().max(0) as u64;
        millis.div_ceil(1000)
    }
}

/// What the purchase area of a detail page offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseState {
    Inactive,
    SoldOut,
    Available { notice: Option<String> },
    Reserved {
        payment_url: String,
        expires_in_secs: u64,
    },
}

impl PurchaseState {
    pub fn resolve(
        details: &ListingDetails,
        reservation: Option<&Reservation>,
        notice: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        if !details.is_active {
            return Self::Inactive;
        }
        if details.remaining_supply == 0 {
            return Self::SoldOut;
        }
        match reservation {
            Some(reservation) if reservation.is_active_at(now) => Self::Reserved {
                payment_url: reservation.payment_url.clone(),
                expires_in_secs: reservation.remaining_secs_at(now),
            },
            _ => Self::Available { notice },
        }
    }
}
