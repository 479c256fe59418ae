use chrono::Utc;
use serde_json::json;

use agrimarket_catalog::query::{
    category_field, location_field, owner_filter, price_field, related_filter,
};
use agrimarket_catalog::{
    CROPS_COLLECTION, Crop, CropId, CropPatch, CropQuery, CropReplacement, LATEST_LIMIT, NewCrop,
    RELATED_LIMIT,
};
use agrimarket_core::{DomainError, Filter, FindOptions, PageInfo, PageRequest, Sort};
use agrimarket_interests::interest::crop_filter;
use agrimarket_interests::{INTERESTS_COLLECTION, Interest};

use crate::document_store::{Document, DocumentStore, decode, encode};

use super::{Page, ServiceError, ServiceResult};

/// A listing with the context shown on its detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct CropView {
    pub crop: Crop,
    pub related: Vec<Crop>,
    pub interests: Vec<Interest>,
}

/// Crop listing operations.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S> CatalogService<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Store a new listing; returns the id the store assigned.
    pub async fn create(&self, input: NewCrop) -> ServiceResult<CropId> {
        let details = input.into_details(Utc::now())?;
        let body = encode(CROPS_COLLECTION, &details)?;
        let id = CropId::new(self.store.insert(CROPS_COLLECTION, body).await?);

        tracing::info!(crop_id = %id, crop_type = %details.crop_type, "crop listed");
        Ok(id)
    }

    /// Search + filter + paginate, most recent first.
    pub async fn list(&self, query: &CropQuery, page: PageRequest) -> ServiceResult<Page<Crop>> {
        self.page(query.to_filter(), page).await
    }

    pub async fn list_by_category(&self, category: &str, page: PageRequest) -> ServiceResult<Page<Crop>> {
        self.page(CropQuery::category(category).to_filter(), page).await
    }

    pub async fn list_by_owner(&self, owner_email: &str) -> ServiceResult<Vec<Crop>> {
        self.find_all(FindOptions::new(owner_filter(owner_email)).sort(Sort::newest_first()))
            .await
    }

    /// Highest priced listings first.
    pub async fn latest(&self) -> ServiceResult<Vec<Crop>> {
        self.find_all(
            FindOptions::new(Filter::all())
                .sort(Sort::descending(price_field()))
                .limit(LATEST_LIMIT),
        )
        .await
    }

    pub async fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.store.distinct(CROPS_COLLECTION, category_field()).await?)
    }

    pub async fn locations(&self) -> ServiceResult<Vec<String>> {
        Ok(self.store.distinct(CROPS_COLLECTION, location_field()).await?)
    }

    pub async fn find(&self, id: CropId) -> ServiceResult<Option<Crop>> {
        self.store
            .find_by_id(CROPS_COLLECTION, id.0)
            .await?
            .map(|doc| decode::<Crop>(CROPS_COLLECTION, doc))
            .transpose()
            .map_err(ServiceError::from)
    }

    pub async fn get(&self, id: CropId) -> ServiceResult<Crop> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Crop").into())
    }

    /// The listing, a few others of the same type, and the interests in it.
    pub async fn get_with_context(&self, id: CropId) -> ServiceResult<CropView> {
        let crop = self.get(id).await?;

        let related = self
            .find_all(
                FindOptions::new(related_filter(&crop))
                    .sort(Sort::newest_first())
                    .limit(RELATED_LIMIT),
            )
            .await?;

        let interests = self
            .store
            .find(
                INTERESTS_COLLECTION,
                &FindOptions::new(crop_filter(id)).sort(Sort::newest_first()),
            )
            .await?
            .into_iter()
            .map(|doc| decode(INTERESTS_COLLECTION, doc))
            .collect::<Result<Vec<Interest>, _>>()?;

        Ok(CropView {
            crop,
            related,
            interests,
        })
    }

    /// Merge the given fields into the listing.
    pub async fn update(&self, id: CropId, patch: CropPatch) -> ServiceResult<Crop> {
        patch.validate()?;
        let set = encode(CROPS_COLLECTION, &patch)?;
        self.write(id, set).await
    }

    /// Overwrite every listing field; `createdAt` is kept.
    pub async fn replace(&self, id: CropId, replacement: CropReplacement) -> ServiceResult<Crop> {
        replacement.validate()?;
        let set = encode(CROPS_COLLECTION, &replacement)?;
        self.write(id, set).await
    }

    pub async fn set_quantity(&self, id: CropId, quantity: u64) -> ServiceResult<Crop> {
        let mut set = Document::new();
        set.insert("quantity".to_string(), json!(quantity));
        self.write(id, set).await
    }

    /// Take `requested` units off the listing, never going below zero.
    /// Returns the new quantity, or `None` when the listing does not exist.
    ///
    /// Read and write are separate store calls: two sales racing on the same
    /// listing can both compute from the same stale quantity and one decrement
    /// is lost.
    pub async fn record_sale(&self, id: CropId, requested: u64) -> ServiceResult<Option<u64>> {
        let Some(crop) = self.find(id).await? else {
            return Ok(None);
        };

        let remaining = crop.details.remaining_after(requested);
        let mut set = Document::new();
        set.insert("quantity".to_string(), json!(remaining));
        set.insert("updatedAt".to_string(), json!(Utc::now()));

        if !self.store.update_by_id(CROPS_COLLECTION, id.0, set).await? {
            // Deleted between the read and the write.
            return Ok(None);
        }

        tracing::info!(
            crop_id = %id,
            previous = crop.details.quantity,
            requested,
            remaining,
            "crop quantity adjusted"
        );
        Ok(Some(remaining))
    }

    /// Remove the listing and every interest that references it. Returns the
    /// number of interests removed.
    pub async fn delete(&self, id: CropId) -> ServiceResult<u64> {
        if !self.store.delete_by_id(CROPS_COLLECTION, id.0).await? {
            return Err(DomainError::not_found("Crop").into());
        }

        let cascaded = self
            .store
            .delete_many(INTERESTS_COLLECTION, &crop_filter(id))
            .await?;

        tracing::info!(crop_id = %id, cascaded, "crop deleted");
        Ok(cascaded)
    }

    async fn write(&self, id: CropId, mut set: Document) -> ServiceResult<Crop> {
        set.insert("updatedAt".to_string(), json!(Utc::now()));
        if !self.store.update_by_id(CROPS_COLLECTION, id.0, set).await? {
            return Err(DomainError::not_found("Crop").into());
        }

        tracing::info!(crop_id = %id, "crop updated");
        self.get(id).await
    }

    async fn page(&self, filter: Filter, page: PageRequest) -> ServiceResult<Page<Crop>> {
        let total = self.store.count(CROPS_COLLECTION, &filter).await?;
        let items = self
            .find_all(
                FindOptions::new(filter)
                    .sort(Sort::newest_first())
                    .skip(page.skip())
                    .limit(page.limit()),
            )
            .await?;

        Ok(Page {
            items,
            info: PageInfo::compute(page, total),
        })
    }

    async fn find_all(&self, options: FindOptions) -> ServiceResult<Vec<Crop>> {
        self.store
            .find(CROPS_COLLECTION, &options)
            .await?
            .into_iter()
            .map(|doc| decode::<Crop>(CROPS_COLLECTION, doc).map_err(ServiceError::from))
            .collect()
    }
}
