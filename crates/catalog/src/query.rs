//! Listing filters.

use agrimarket_core::Filter;

use crate::crop::Crop;

/// Number of related listings shown next to a listing.
pub const RELATED_LIMIT: u64 = 3;

/// Number of listings in the "latest" strip.
pub const LATEST_LIMIT: u64 = 6;

pub(crate) const FIELD_NAME: &str = "name";
pub(crate) const FIELD_TYPE: &str = "type";
pub(crate) const FIELD_LOCATION: &str = "location";
pub(crate) const FIELD_OWNER_EMAIL: &str = "owner.ownerEmail";
pub(crate) const FIELD_PRICE: &str = "pricePerUnit";

/// Filters accepted by the listing search. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
}

impl CropQuery {
    /// `search` matches name, type or location (case-insensitive substring);
    /// `category` and `location` must match exactly. All parts are ANDed.
    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::all();
        if let Some(search) = non_blank(&self.search) {
            filter = filter.contains_any_ignore_case([FIELD_NAME, FIELD_TYPE, FIELD_LOCATION], search);
        }
        if let Some(category) = non_blank(&self.category) {
            filter = filter.eq(FIELD_TYPE, category);
        }
        if let Some(location) = non_blank(&self.location) {
            filter = filter.eq(FIELD_LOCATION, location);
        }
        filter
    }

    /// Exact category match only.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }
}

/// Listings owned by the seller with this email.
pub fn owner_filter(owner_email: &str) -> Filter {
    Filter::all().eq(FIELD_OWNER_EMAIL, owner_email)
}

/// Other listings in the same category as `crop`.
pub fn related_filter(crop: &Crop) -> Filter {
    Filter::all()
        .eq(FIELD_TYPE, crop.details.crop_type.as_str())
        .exclude_id(crop.id.0)
}

/// Field the category facet is built from.
pub fn category_field() -> &'static str {
    FIELD_TYPE
}

/// Field the location facet is built from.
pub fn location_field() -> &'static str {
    FIELD_LOCATION
}

/// Field the "latest" strip is ordered by.
pub fn price_field() -> &'static str {
    FIELD_PRICE
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
