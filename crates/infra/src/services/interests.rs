use chrono::Utc;
use serde_json::json;

use agrimarket_catalog::CropId;
use agrimarket_core::{DomainError, FindOptions, Sort};
use agrimarket_interests::interest::{buyer_filter, crop_filter};
use agrimarket_interests::{
    INTERESTS_COLLECTION, Interest, InterestId, InterestStatus, InterestWithCrop, NewInterest,
    StatusChange,
};

use crate::document_store::{Document, DocumentStore, decode, encode};

use super::catalog::CatalogService;
use super::{ServiceError, ServiceResult};

const DUPLICATE_MESSAGE: &str = "You have already expressed interest in this crop";

/// Buyer interest operations.
#[derive(Debug, Clone)]
pub struct InterestService<S> {
    store: S,
    catalog: CatalogService<S>,
}

impl<S> InterestService<S>
where
    S: DocumentStore + Clone,
{
    pub fn new(store: S) -> Self {
        let catalog = CatalogService::new(store.clone());
        Self { store, catalog }
    }

    /// Record a buyer's interest. One interest per (crop, buyer).
    pub async fn submit(&self, input: NewInterest) -> ServiceResult<Interest> {
        input.validate()?;

        if self.catalog.find(input.crop_id).await?.is_none() {
            return Err(DomainError::not_found("Crop").into());
        }

        if self
            .store
            .find_one(INTERESTS_COLLECTION, &input.duplicate_filter())
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(DUPLICATE_MESSAGE).into());
        }

        let details = input.into_details(Utc::now())?;
        let body = encode(INTERESTS_COLLECTION, &details)?;
        let id = InterestId::new(self.store.insert(INTERESTS_COLLECTION, body).await?);

        tracing::info!(
            interest_id = %id,
            crop_id = %details.crop_id,
            quantity = details.quantity,
            "interest submitted"
        );
        Ok(Interest { id, details })
    }

    /// A buyer's interests, most recent first, each with its listing.
    pub async fn list_by_buyer(&self, user_email: &str) -> ServiceResult<Vec<InterestWithCrop>> {
        let interests = self
            .find_all(FindOptions::new(buyer_filter(user_email)).sort(Sort::newest_first()))
            .await?;

        let mut enriched = Vec::with_capacity(interests.len());
        for interest in interests {
            let crop = self.catalog.find(interest.details.crop_id).await?;
            enriched.push(InterestWithCrop { interest, crop });
        }
        Ok(enriched)
    }

    pub async fn list_by_crop(&self, crop_id: CropId) -> ServiceResult<Vec<Interest>> {
        self.find_all(FindOptions::new(crop_filter(crop_id)).sort(Sort::newest_first()))
            .await
    }

    pub async fn get(&self, id: InterestId) -> ServiceResult<Interest> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Interest").into())
    }

    /// Move an interest to `status`. Accepting sells the requested quantity
    /// from the listing; a listing that no longer exists is skipped.
    pub async fn update_status(&self, id: InterestId, status: InterestStatus) -> ServiceResult<Interest> {
        let current = self.get(id).await?;

        let StatusChange::Changed { from, to } = StatusChange::between(current.details.status, status)
        else {
            return Ok(current);
        };

        let mut set = Document::new();
        set.insert("status".to_string(), json!(to));
        set.insert("updatedAt".to_string(), json!(Utc::now()));
        if !self.store.update_by_id(INTERESTS_COLLECTION, id.0, set).await? {
            return Err(DomainError::not_found("Interest").into());
        }
        tracing::info!(interest_id = %id, ?from, ?to, "interest status changed");

        // Re-read to pick up the requested quantity as stored now.
        let updated = self.get(id).await?;
        if to.adjusts_inventory() && updated.details.quantity > 0 {
            let crop_id = updated.details.crop_id;
            if self
                .catalog
                .record_sale(crop_id, updated.details.quantity)
                .await?
                .is_none()
            {
                tracing::warn!(
                    interest_id = %id,
                    crop_id = %crop_id,
                    "accepted interest references a missing crop; inventory not adjusted"
                );
            }
        }

        Ok(updated)
    }

    pub async fn delete(&self, id: InterestId) -> ServiceResult<()> {
        if !self.store.delete_by_id(INTERESTS_COLLECTION, id.0).await? {
            return Err(DomainError::not_found("Interest").into());
        }
        tracing::info!(interest_id = %id, "interest deleted");
        Ok(())
    }

    async fn find(&self, id: InterestId) -> ServiceResult<Option<Interest>> {
        self.store
            .find_by_id(INTERESTS_COLLECTION, id.0)
            .await?
            .map(|doc| decode::<Interest>(INTERESTS_COLLECTION, doc))
            .transpose()
            .map_err(ServiceError::from)
    }

    async fn find_all(&self, options: FindOptions) -> ServiceResult<Vec<Interest>> {
        self.store
            .find(INTERESTS_COLLECTION, &options)
            .await?
            .into_iter()
            .map(|doc| decode::<Interest>(INTERESTS_COLLECTION, doc).map_err(ServiceError::from))
            .collect()
    }
}
