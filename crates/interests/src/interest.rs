use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrimarket_catalog::{Crop, CropId};
use agrimarket_core::{DocumentId, DomainError, DomainResult, Filter};

/// Collection holding buyer interests.
pub const INTERESTS_COLLECTION: &str = "interests";

const FIELD_CROP_ID: &str = "cropId";
const FIELD_USER_EMAIL: &str = "userEmail";

/// Interest identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterestId(pub DocumentId);

impl InterestId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InterestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for InterestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentId::from_str(s)
            .map(Self)
            .map_err(|_| DomainError::invalid_id("Invalid interest id"))
    }
}

/// Interest status lifecycle: `pending` → `accepted` | `rejected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl InterestStatus {
    /// Accepting an interest sells the requested quantity.
    pub fn adjusts_inventory(self) -> bool {
        matches!(self, InterestStatus::Accepted)
    }
}

/// Outcome of asking for a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The interest already has this status; nothing to write.
    Unchanged,
    /// The status moves from `from` to `to`.
    Changed {
        from: InterestStatus,
        to: InterestStatus,
    },
}

impl StatusChange {
    pub fn between(current: InterestStatus, requested: InterestStatus) -> Self {
        if current == requested {
            StatusChange::Unchanged
        } else {
            StatusChange::Changed {
                from: current,
                to: requested,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestDetails {
    pub crop_id: CropId,
    pub user_email: String,
    pub user_name: String,
    pub quantity: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A stored buyer interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    #[serde(rename = "_id")]
    pub id: InterestId,
    #[serde(flatten)]
    pub details: InterestDetails,
}

/// An interest shown to its buyer together with the listing it targets.
/// `crop` is `None` when the listing no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterestWithCrop {
    #[serde(flatten)]
    pub interest: Interest,
    pub crop: Option<Crop>,
}

/// Input schema for submitting an interest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterest {
    pub crop_id: CropId,
    pub user_email: String,
    pub user_name: String,
    pub quantity: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<InterestStatus>,
}

impl NewInterest {
    pub fn validate(&self) -> DomainResult<()> {
        if self.user_email.trim().is_empty() || !self.user_email.contains('@') {
            return Err(DomainError::validation("userEmail must be an email address"));
        }
        if self.user_name.trim().is_empty() {
            return Err(DomainError::validation("userName must not be empty"));
        }
        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        Ok(())
    }

    /// Validate and stamp server-assigned fields. Status defaults to pending.
    pub fn into_details(self, created_at: DateTime<Utc>) -> DomainResult<InterestDetails> {
        self.validate()?;
        Ok(InterestDetails {
            crop_id: self.crop_id,
            user_email: self.user_email,
            user_name: self.user_name,
            quantity: self.quantity,
            message: self.message,
            status: self.status.unwrap_or_default(),
            created_at,
            updated_at: None,
        })
    }

    /// Matches an earlier interest from the same buyer in the same crop.
    pub fn duplicate_filter(&self) -> Filter {
        Filter::all()
            .eq(FIELD_CROP_ID, self.crop_id.to_string())
            .eq(FIELD_USER_EMAIL, self.user_email.as_str())
    }
}

/// Interests referencing `crop_id`.
pub fn crop_filter(crop_id: CropId) -> Filter {
    Filter::all().eq(FIELD_CROP_ID, crop_id.to_string())
}

/// Interests submitted by the buyer with this email.
pub fn buyer_filter(user_email: &str) -> Filter {
    Filter::all().eq(FIELD_USER_EMAIL, user_email)
}
