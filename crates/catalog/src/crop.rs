use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrimarket_core::{DocumentId, DomainError, DomainResult};

/// Collection holding crop listings.
pub const CROPS_COLLECTION: &str = "crops";

/// Crop listing identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropId(pub DocumentId);

impl CropId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CropId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CropId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentId::from_str(s)
            .map(Self)
            .map_err(|_| DomainError::invalid_id("Invalid crop id"))
    }
}

/// Listing status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    #[default]
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub owner_name: String,
    pub owner_email: String,
}

impl Owner {
    fn validate(&self) -> DomainResult<()> {
        require_text("owner.ownerName", &self.owner_name)?;
        require_email("owner.ownerEmail", &self.owner_email)
    }
}

/// Everything a stored listing carries apart from its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDetails {
    pub name: String,
    pub price_per_unit: f64,
    pub quantity: u64,
    pub unit: String,
    #[serde(rename = "type")]
    pub crop_type: String,
    pub location: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: CropStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CropDetails {
    /// Quantity left after selling `requested` units. Never negative.
    pub fn remaining_after(&self, requested: u64) -> u64 {
        self.quantity.saturating_sub(requested)
    }
}

/// A stored crop listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    #[serde(rename = "_id")]
    pub id: CropId,
    #[serde(flatten)]
    pub details: CropDetails,
}

/// Input schema for creating a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCrop {
    pub name: String,
    pub price_per_unit: f64,
    pub quantity: u64,
    pub unit: String,
    #[serde(rename = "type")]
    pub crop_type: String,
    pub location: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub owner: Owner,
}

impl NewCrop {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("name", &self.name)?;
        require_price(self.price_per_unit)?;
        require_text("unit", &self.unit)?;
        require_text("type", &self.crop_type)?;
        require_text("location", &self.location)?;
        self.owner.validate()
    }

    /// Validate and stamp server-assigned fields. Values are stored as given.
    pub fn into_details(self, created_at: DateTime<Utc>) -> DomainResult<CropDetails> {
        self.validate()?;
        Ok(CropDetails {
            name: self.name,
            price_per_unit: self.price_per_unit,
            quantity: self.quantity,
            unit: self.unit,
            crop_type: self.crop_type,
            location: self.location,
            image: self.image,
            description: self.description,
            owner: self.owner,
            created_at,
            status: CropStatus::Available,
            updated_at: None,
        })
    }
}

/// Input schema for a full replace: every listing field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropReplacement {
    #[serde(flatten)]
    pub listing: NewCrop,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CropStatus>,
}

impl CropReplacement {
    pub fn validate(&self) -> DomainResult<()> {
        self.listing.validate()
    }
}

/// Input schema for a partial edit. Absent fields are left untouched; the
/// id is not part of the schema and can never be changed through it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CropStatus>,
}

impl CropPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(price) = self.price_per_unit {
            require_price(price)?;
        }
        if let Some(unit) = &self.unit {
            require_text("unit", unit)?;
        }
        if let Some(crop_type) = &self.crop_type {
            require_text("type", crop_type)?;
        }
        if let Some(location) = &self.location {
            require_text("location", location)?;
        }
        if let Some(owner) = &self.owner {
            owner.validate()?;
        }
        Ok(())
    }
}

fn require_text(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_email(field: &str, value: &str) -> DomainResult<()> {
    require_text(field, value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::validation(format!(
            "{field} must be an email address"
        ))),
    }
}

fn require_price(value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(
            "pricePerUnit must be a non-negative number",
        ));
    }
    Ok(())
}
