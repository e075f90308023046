use serde::Serialize;
use uuid::Uuid;

use crate::domain::catalog::{NewMedia, NewProduct, NewVariant, Product};
use crate::domain::offer::NewMerchantOffer;
use crate::domain::options::{
    MAX_VARIANT_COMBINATIONS, combination_count, cross_product, kebab_case, restricted_key,
};
use crate::domain::staging::{StagingAggregate, StagingVariant};
use crate::domain::types::{
    CatalogStatus, InternalSku, ProductId, ProductSlug, StagingProductId, StagingStatus,
    StagingVariantId, VariantId,
};
use crate::forms::review::{
    ACTION_CREATE_NEW, ACTION_LINK_EXISTING, ACTION_REJECT, CreateNewPayload, LinkExistingPayload,
    MediaSelection, RejectPayload, ReviewDecision, ReviewDecisionForm, VariantMappingEntry,
};
use crate::repository::{ReviewStore, ReviewWriter};
use crate::services::clock::Clock;
use crate::services::{ServiceError, ServiceResult};

/// What a decision wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionOutcome {
    pub staging_id: StagingProductId,
    pub action: &'static str,
    pub status: StagingStatus,
    pub product_id: Option<ProductId>,
    pub variants_created: usize,
    pub offers_created: usize,
    pub media_created: usize,
}

fn opaque_suffix(len: usize) -> String {
    Uuid::new_v4().simple().to_string().chars().take(len).collect()
}

fn generated_slug(title: &str) -> String {
    let base = kebab_case(title);
    let base = if base.is_empty() { "product" } else { &base };
    format!("{base}-{}", opaque_suffix(8))
}

fn generated_sku(slug: &str, values: &[&str]) -> String {
    let options = kebab_case(&values.join("-"));
    if options.is_empty() {
        format!("{slug}-{}", opaque_suffix(6))
    } else {
        format!("{slug}-{options}-{}", opaque_suffix(6))
    }
}

fn staging_variant<'a>(
    staging: &'a StagingAggregate,
    id: StagingVariantId,
) -> ServiceResult<&'a StagingVariant> {
    staging
        .variants
        .iter()
        .find(|v| v.id == id)
        .ok_or_else(|| {
            ServiceError::BadRequest(format!(
                "staging variant {id} does not belong to staging product {}",
                staging.product.id
            ))
        })
}

fn check_media_ownership(staging: &StagingAggregate, media: &MediaSelection) -> ServiceResult<()> {
    for id in &media.selected_media_ids {
        if !staging.media.iter().any(|m| m.id == *id) {
            return Err(ServiceError::BadRequest(format!(
                "media {id} does not belong to staging product {}",
                staging.product.id
            )));
        }
    }
    Ok(())
}

/// Copy selected staging media then extra media onto `product`, starting at
/// `position`. The first URL fills the product image when it has none.
fn attach_media(
    store: &mut dyn ReviewStore,
    staging: &StagingAggregate,
    product: &Product,
    media: &MediaSelection,
    mut position: i32,
) -> ServiceResult<usize> {
    let mut rows = Vec::new();
    for id in &media.selected_media_ids {
        if let Some(item) = staging.media.iter().find(|m| m.id == *id) {
            rows.push((item.source_url.clone(), item.alt_text.clone()));
        }
    }
    for extra in &media.extra_media {
        rows.push((extra.url.clone(), extra.alt_text.clone()));
    }

    if let Some((first_url, _)) = rows.first() {
        store.fill_product_image(product.id, first_url.as_str())?;
    }

    for (src_url, alt_text) in &rows {
        store.insert_media(&NewMedia {
            product_id: product.id,
            src_url: src_url.clone(),
            alt_text: alt_text.clone(),
            position,
        })?;
        position += 1;
    }
    Ok(rows.len())
}

fn create_offer(
    store: &mut dyn ReviewStore,
    staging: &StagingAggregate,
    variant: &StagingVariant,
    variant_id: VariantId,
) -> ServiceResult<bool> {
    let offer = NewMerchantOffer::from_staging(&staging.product, variant, variant_id)?;
    Ok(store.insert_offer_if_absent(&offer)?)
}

fn reject(
    store: &mut dyn ReviewStore,
    staging: &StagingAggregate,
    payload: RejectPayload,
) -> ServiceResult<DecisionOutcome> {
    store.reject_staging(
        staging.product.id,
        payload.rejection_reason.as_deref(),
        payload.admin_notes.as_deref(),
    )?;
    Ok(DecisionOutcome {
        staging_id: staging.product.id,
        action: ACTION_REJECT,
        status: StagingStatus::Rejected,
        product_id: None,
        variants_created: 0,
        offers_created: 0,
        media_created: 0,
    })
}

fn create_new(
    store: &mut dyn ReviewStore,
    staging: &StagingAggregate,
    payload: CreateNewPayload,
) -> ServiceResult<DecisionOutcome> {
    let definition = payload.options_definition;
    let count = combination_count(&definition);
    if count > MAX_VARIANT_COMBINATIONS {
        return Err(ServiceError::BadRequest(format!(
            "options definition yields {count} variants, more than the limit of {MAX_VARIANT_COMBINATIONS}"
        )));
    }

    if let Some(brand_id) = payload.brand_id
        && !store.brand_exists(brand_id)?
    {
        return Err(ServiceError::BadRequest(format!("unknown brand {brand_id}")));
    }
    for category_id in &payload.category_ids {
        if !store.category_exists(*category_id)? {
            return Err(ServiceError::BadRequest(format!(
                "unknown category {category_id}"
            )));
        }
    }
    check_media_ownership(staging, &payload.media)?;

    let slug = match payload.slug {
        Some(slug) => {
            if store.slug_exists(slug.as_str())? {
                return Err(ServiceError::BadRequest(format!(
                    "slug {slug} is already in use"
                )));
            }
            slug
        }
        None => ProductSlug::new(generated_slug(payload.title.as_str()))?,
    };

    let product = store.insert_product(&NewProduct {
        brand_id: payload.brand_id,
        title: payload.title,
        slug,
        description: payload.description,
        options_definition: definition.clone(),
        specifications: payload.specifications,
        status: CatalogStatus::Active,
    })?;

    let media_created = attach_media(store, staging, &product, &payload.media, 0)?;
    store.link_categories(product.id, &payload.category_ids)?;

    let mut unmatched: Vec<(String, &StagingVariant)> = staging
        .variants
        .iter()
        .map(|v| (restricted_key(&v.raw_options, &definition), v))
        .collect();

    let mut variants_created = 0;
    let mut offers_created = 0;
    for combination in cross_product(&definition) {
        let values: Vec<&str> = combination.values().map(String::as_str).collect();
        let sku = InternalSku::new(generated_sku(product.slug.as_str(), &values))?;
        let key = restricted_key(&combination, &definition);

        let variant = store.insert_variant(&NewVariant::active(product.id, sku, combination))?;
        variants_created += 1;

        if let Some(index) = unmatched.iter().position(|(k, _)| *k == key) {
            let (_, source) = unmatched.remove(index);
            if create_offer(store, staging, source, variant.id)? {
                offers_created += 1;
            }
        }
    }

    store.approve_staging(staging.product.id)?;

    Ok(DecisionOutcome {
        staging_id: staging.product.id,
        action: ACTION_CREATE_NEW,
        status: StagingStatus::Approved,
        product_id: Some(product.id),
        variants_created,
        offers_created,
        media_created,
    })
}

fn link_existing(
    store: &mut dyn ReviewStore,
    staging: &StagingAggregate,
    payload: LinkExistingPayload,
) -> ServiceResult<DecisionOutcome> {
    let master = store
        .product(payload.master_product_id)?
        .ok_or(ServiceError::NotFound)?;

    for entry in &payload.variant_mapping {
        if let Some(id) = entry.staging_variant_id() {
            staging_variant(staging, id)?;
        }
    }
    check_media_ownership(staging, &payload.media)?;

    let staging_id = staging.product.id;
    let mut variants_created = 0;
    let mut offers_created = 0;

    for entry in payload.variant_mapping {
        match entry {
            VariantMappingEntry::Link {
                staging_variant_id,
                master_variant_id,
            } => {
                let source = staging_variant(staging, staging_variant_id)?;
                let target = store
                    .variant(master_variant_id)?
                    .ok_or(ServiceError::NotFound)?;
                if target.product_id != master.id {
                    return Err(ServiceError::BadRequest(format!(
                        "variant {master_variant_id} does not belong to product {}",
                        master.id
                    )));
                }
                if create_offer(store, staging, source, target.id)? {
                    offers_created += 1;
                }
            }
            VariantMappingEntry::AddFromStaging {
                staging_variant_id,
                attributes,
            } => {
                let source = staging_variant(staging, staging_variant_id)?;
                let options = if attributes.is_empty() {
                    source.raw_options.clone()
                } else {
                    attributes
                };
                let sku = InternalSku::new(format!("LINK-{staging_id}-{staging_variant_id}"))?;
                let variant = store.insert_variant(&NewVariant::active(master.id, sku, options))?;
                variants_created += 1;
                if create_offer(store, staging, source, variant.id)? {
                    offers_created += 1;
                }
            }
            VariantMappingEntry::Manual { attributes } => {
                if attributes.is_empty() {
                    continue;
                }
                let sku = InternalSku::new(format!("MANUAL-{staging_id}-{}", opaque_suffix(8)))?;
                store.insert_variant(&NewVariant::active(master.id, sku, attributes))?;
                variants_created += 1;
            }
        }
    }

    let media_created = if payload.media.is_empty() {
        0
    } else {
        let position = store.next_media_position(master.id)?;
        attach_media(store, staging, &master, &payload.media, position)?
    };

    store.approve_staging(staging_id)?;

    Ok(DecisionOutcome {
        staging_id,
        action: ACTION_LINK_EXISTING,
        status: StagingStatus::Approved,
        product_id: Some(master.id),
        variants_created,
        offers_created,
        media_created,
    })
}

/// Apply a parsed decision to one staging product in a single transaction.
pub fn decide<R>(
    staging_id: StagingProductId,
    decision: ReviewDecision,
    repo: &R,
    clock: &dyn Clock,
) -> ServiceResult<DecisionOutcome>
where
    R: ReviewWriter,
{
    let action = decision.action();

    let result = repo.review_transaction::<_, ServiceError, _>(clock.now(), |store| {
        let staging = store
            .staging_product(staging_id)?
            .ok_or(ServiceError::NotFound)?;
        match decision {
            ReviewDecision::Reject(payload) => reject(store, &staging, payload),
            ReviewDecision::CreateNew(payload) => create_new(store, &staging, payload),
            ReviewDecision::LinkExisting(payload) => link_existing(store, &staging, payload),
        }
    });

    match &result {
        Ok(outcome) => log::info!(
            "{action} applied to staging product {staging_id}: {} variants, {} offers",
            outcome.variants_created,
            outcome.offers_created
        ),
        Err(e) => log::warn!("{action} on staging product {staging_id} rolled back: {e}"),
    }
    result
}

/// Parse the submitted form and apply the decision.
pub fn submit_decision<R>(
    staging_id: i32,
    form: ReviewDecisionForm,
    repo: &R,
    clock: &dyn Clock,
) -> ServiceResult<DecisionOutcome>
where
    R: ReviewWriter,
{
    let staging_id = StagingProductId::new(staging_id).map_err(|_| ServiceError::NotFound)?;
    let decision = ReviewDecision::try_from(form)?;
    decide(staging_id, decision, repo, clock)
}
