use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::options::{OptionsDefinition, VariantOptions, distinct_options};
use crate::domain::types::{
    BrandId, CategoryId, MediaUrl, ProductId, ProductSlug, ProductTitle, StagingMediaId,
    StagingVariantId, TypeConstraintError, VariantId,
};

pub const ACTION_CREATE_NEW: &str = "CREATE_NEW";
pub const ACTION_LINK_EXISTING: &str = "LINK_EXISTING";
pub const ACTION_REJECT: &str = "REJECT";

/// Reviewer decision as submitted by the admin UI.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewDecisionForm {
    #[validate(length(min = 1))]
    pub action: String,
    #[validate(nested)]
    pub clean_data: Option<CleanDataForm>,
    pub master_product_id: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub variant_mapping: Vec<VariantMappingForm>,
    #[validate(length(max = 2000))]
    pub rejection_reason: Option<String>,
    #[validate(length(max = 4000))]
    pub admin_notes: Option<String>,
}

/// Curated product data entered by the reviewer.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CleanDataForm {
    #[validate(length(max = 512))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub brand_id: Option<i32>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
    #[serde(default)]
    pub selected_media_ids: Vec<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub extra_media: Vec<ExtraMediaForm>,
    pub options_definition: Option<OptionsDefinition>,
    pub specifications: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ExtraMediaForm {
    #[validate(length(max = 2048))]
    pub url: String,
    #[validate(length(max = 512))]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VariantMappingForm {
    pub staging_variant_id: Option<i32>,
    pub master_variant_id: Option<i32>,
    pub new_variant_attributes: Option<VariantOptions>,
}

/// Media a decision attaches to the canonical product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaSelection {
    /// Staging media to copy, in display order.
    pub selected_media_ids: Vec<StagingMediaId>,
    pub extra_media: Vec<ExtraMedia>,
}

impl MediaSelection {
    pub fn is_empty(&self) -> bool {
        self.selected_media_ids.is_empty() && self.extra_media.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtraMedia {
    pub url: MediaUrl,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateNewPayload {
    pub title: ProductTitle,
    pub slug: Option<ProductSlug>,
    pub description: Option<String>,
    pub brand_id: Option<BrandId>,
    pub category_ids: Vec<CategoryId>,
    pub media: MediaSelection,
    pub options_definition: OptionsDefinition,
    pub specifications: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariantMappingEntry {
    /// Offer the staging variant against an existing master variant.
    Link {
        staging_variant_id: StagingVariantId,
        master_variant_id: VariantId,
    },
    /// New master variant backed by a staging variant. Empty attributes fall
    /// back to the staging variant's own options.
    AddFromStaging {
        staging_variant_id: StagingVariantId,
        attributes: VariantOptions,
    },
    /// New master variant with no merchant offer.
    Manual { attributes: VariantOptions },
}

impl VariantMappingEntry {
    pub fn staging_variant_id(&self) -> Option<StagingVariantId> {
        match self {
            VariantMappingEntry::Link {
                staging_variant_id, ..
            }
            | VariantMappingEntry::AddFromStaging {
                staging_variant_id, ..
            } => Some(*staging_variant_id),
            VariantMappingEntry::Manual { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkExistingPayload {
    pub master_product_id: ProductId,
    pub variant_mapping: Vec<VariantMappingEntry>,
    pub media: MediaSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectPayload {
    pub rejection_reason: Option<String>,
    pub admin_notes: Option<String>,
}

/// Parsed decision with the fields each action requires.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    CreateNew(CreateNewPayload),
    LinkExisting(LinkExistingPayload),
    Reject(RejectPayload),
}

impl ReviewDecision {
    pub fn action(&self) -> &'static str {
        match self {
            ReviewDecision::CreateNew(_) => ACTION_CREATE_NEW,
            ReviewDecision::LinkExisting(_) => ACTION_LINK_EXISTING,
            ReviewDecision::Reject(_) => ACTION_REJECT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReviewFormError {
    #[error("Review decision validation failed: {0}")]
    Validation(String),
    #[error("Review decision contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("clean_data.title required for CREATE_NEW")]
    MissingTitle,
    #[error("master_product_id required for LINK_EXISTING")]
    MissingMasterProduct,
    #[error("variant_mapping[{0}]: master_variant_id and new_variant_attributes are mutually exclusive")]
    ConflictingMapping(usize),
    #[error("variant_mapping[{0}]: master_variant_id requires staging_variant_id")]
    MasterVariantWithoutStaging(usize),
}

impl From<ValidationErrors> for ReviewFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ReviewFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_media(clean: &CleanDataForm) -> Result<MediaSelection, ReviewFormError> {
    let selected_media_ids = clean
        .selected_media_ids
        .iter()
        .map(|id| StagingMediaId::new(*id))
        .collect::<Result<Vec<_>, _>>()?;

    // Blank rows left in the editor are dropped.
    let extra_media = clean
        .extra_media
        .iter()
        .filter(|m| !m.url.trim().is_empty())
        .map(|m| {
            Ok(ExtraMedia {
                url: MediaUrl::new(m.url.as_str())?,
                alt_text: non_blank(m.alt_text.clone()),
            })
        })
        .collect::<Result<Vec<_>, TypeConstraintError>>()?;

    Ok(MediaSelection {
        selected_media_ids,
        extra_media,
    })
}

fn parse_create_new(clean: Option<CleanDataForm>) -> Result<CreateNewPayload, ReviewFormError> {
    let clean = clean.ok_or(ReviewFormError::MissingTitle)?;
    let title = match non_blank(clean.title.clone()) {
        Some(title) => ProductTitle::new(title)?,
        None => return Err(ReviewFormError::MissingTitle),
    };

    let slug = non_blank(clean.slug.clone())
        .map(ProductSlug::new)
        .transpose()?;
    let brand_id = clean.brand_id.map(BrandId::new).transpose()?;

    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(clean.category_ids.len());
    for id in &clean.category_ids {
        let id = CategoryId::new(*id)?;
        if !category_ids.contains(&id) {
            category_ids.push(id);
        }
    }

    let media = parse_media(&clean)?;

    let specifications = match clean.specifications {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(value) => value,
    };

    Ok(CreateNewPayload {
        title,
        slug,
        description: non_blank(clean.description),
        brand_id,
        category_ids,
        media,
        options_definition: distinct_options(clean.options_definition.unwrap_or_default()),
        specifications,
    })
}

fn parse_mapping(
    index: usize,
    entry: VariantMappingForm,
) -> Result<VariantMappingEntry, ReviewFormError> {
    let attributes = entry.new_variant_attributes.unwrap_or_default();
    let staging_variant_id = entry
        .staging_variant_id
        .map(StagingVariantId::new)
        .transpose()?;
    let master_variant_id = entry.master_variant_id.map(VariantId::new).transpose()?;

    match (staging_variant_id, master_variant_id) {
        (_, Some(_)) if !attributes.is_empty() => Err(ReviewFormError::ConflictingMapping(index)),
        (Some(staging_variant_id), Some(master_variant_id)) => Ok(VariantMappingEntry::Link {
            staging_variant_id,
            master_variant_id,
        }),
        (Some(staging_variant_id), None) => Ok(VariantMappingEntry::AddFromStaging {
            staging_variant_id,
            attributes,
        }),
        (None, Some(_)) => Err(ReviewFormError::MasterVariantWithoutStaging(index)),
        (None, None) => Ok(VariantMappingEntry::Manual { attributes }),
    }
}

fn parse_link_existing(form: ReviewDecisionForm) -> Result<LinkExistingPayload, ReviewFormError> {
    let master_product_id = match form.master_product_id {
        Some(id) => ProductId::new(id)?,
        None => return Err(ReviewFormError::MissingMasterProduct),
    };

    let variant_mapping = form
        .variant_mapping
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_mapping(index, entry))
        .collect::<Result<Vec<_>, _>>()?;

    let media = match &form.clean_data {
        Some(clean) => parse_media(clean)?,
        None => MediaSelection::default(),
    };

    Ok(LinkExistingPayload {
        master_product_id,
        variant_mapping,
        media,
    })
}

impl TryFrom<ReviewDecisionForm> for ReviewDecision {
    type Error = ReviewFormError;

    fn try_from(form: ReviewDecisionForm) -> Result<Self, Self::Error> {
        form.validate()?;

        match form.action.trim() {
            ACTION_CREATE_NEW => Ok(ReviewDecision::CreateNew(parse_create_new(form.clean_data)?)),
            ACTION_LINK_EXISTING => Ok(ReviewDecision::LinkExisting(parse_link_existing(form)?)),
            ACTION_REJECT => Ok(ReviewDecision::Reject(RejectPayload {
                rejection_reason: form.rejection_reason,
                admin_notes: form.admin_notes,
            })),
            other => Err(ReviewFormError::UnknownAction(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<ReviewDecision, ReviewFormError> {
        let form: ReviewDecisionForm = serde_json::from_value(value).unwrap();
        ReviewDecision::try_from(form)
    }

    #[test]
    fn create_new_requires_title() {
        assert!(matches!(
            parse(json!({ "action": "CREATE_NEW" })),
            Err(ReviewFormError::MissingTitle)
        ));
        assert!(matches!(
            parse(json!({ "action": "CREATE_NEW", "clean_data": { "title": "   " } })),
            Err(ReviewFormError::MissingTitle)
        ));
    }

    #[test]
    fn create_new_keeps_option_order_and_defaults() {
        let decision = parse(json!({
            "action": "CREATE_NEW",
            "clean_data": {
                "title": "Linen Shirt",
                "category_ids": [3, 3, 4],
                "options_definition": { "Size": ["S", "M"], "Color": ["Red"] },
                "extra_media": [{ "url": "  " }, { "url": "https://cdn/x.jpg", "alt_text": "x" }]
            }
        }))
        .unwrap();

        let ReviewDecision::CreateNew(payload) = decision else {
            panic!("expected CREATE_NEW");
        };
        assert_eq!(payload.title.as_str(), "Linen Shirt");
        assert_eq!(payload.slug, None);
        assert_eq!(payload.category_ids.len(), 2);
        let keys: Vec<_> = payload.options_definition.keys().cloned().collect();
        assert_eq!(keys, vec!["Size", "Color"]);
        assert_eq!(payload.specifications, json!({}));
        assert_eq!(payload.media.extra_media.len(), 1);
        assert_eq!(payload.media.extra_media[0].url.as_str(), "https://cdn/x.jpg");
    }

    #[test]
    fn create_new_collapses_repeated_options() {
        let decision = parse(json!({
            "action": "CREATE_NEW",
            "clean_data": {
                "title": "Linen Shirt",
                "options_definition": { "Color": ["Red", " red "], "COLOR": ["Blue"] }
            }
        }))
        .unwrap();

        let ReviewDecision::CreateNew(payload) = decision else {
            panic!("expected CREATE_NEW");
        };
        assert_eq!(payload.options_definition.len(), 1);
        assert_eq!(payload.options_definition["Color"], vec!["Red", "Blue"]);
    }

    #[test]
    fn link_existing_requires_master_product() {
        assert!(matches!(
            parse(json!({ "action": "LINK_EXISTING", "variant_mapping": [] })),
            Err(ReviewFormError::MissingMasterProduct)
        ));
    }

    #[test]
    fn link_existing_classifies_mapping_entries() {
        let decision = parse(json!({
            "action": "LINK_EXISTING",
            "master_product_id": 7,
            "variant_mapping": [
                { "staging_variant_id": 1, "master_variant_id": 70 },
                { "staging_variant_id": 2, "new_variant_attributes": { "Color": "Green" } },
                { "new_variant_attributes": { "Type": "Manual" } }
            ]
        }))
        .unwrap();

        let ReviewDecision::LinkExisting(payload) = decision else {
            panic!("expected LINK_EXISTING");
        };
        assert_eq!(payload.master_product_id, 7);
        assert!(matches!(
            payload.variant_mapping[0],
            VariantMappingEntry::Link { .. }
        ));
        assert!(matches!(
            payload.variant_mapping[1],
            VariantMappingEntry::AddFromStaging { .. }
        ));
        assert!(matches!(
            payload.variant_mapping[2],
            VariantMappingEntry::Manual { .. }
        ));
        assert!(payload.media.is_empty());
    }

    #[test]
    fn both_master_variant_and_attributes_is_rejected() {
        let result = parse(json!({
            "action": "LINK_EXISTING",
            "master_product_id": 7,
            "variant_mapping": [
                { "staging_variant_id": 1, "master_variant_id": 70,
                  "new_variant_attributes": { "Color": "Red" } }
            ]
        }));
        assert!(matches!(result, Err(ReviewFormError::ConflictingMapping(0))));
    }

    #[test]
    fn master_variant_without_staging_variant_is_rejected() {
        let result = parse(json!({
            "action": "LINK_EXISTING",
            "master_product_id": 7,
            "variant_mapping": [{ "master_variant_id": 70 }]
        }));
        assert!(matches!(
            result,
            Err(ReviewFormError::MasterVariantWithoutStaging(0))
        ));
    }

    #[test]
    fn reject_keeps_text_verbatim() {
        let decision = parse(json!({
            "action": "REJECT",
            "rejection_reason": " Duplicate listing ",
            "admin_notes": "see #12"
        }))
        .unwrap();
        assert_eq!(
            decision,
            ReviewDecision::Reject(RejectPayload {
                rejection_reason: Some(" Duplicate listing ".to_string()),
                admin_notes: Some("see #12".to_string()),
            })
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(matches!(
            parse(json!({ "action": "MERGE" })),
            Err(ReviewFormError::UnknownAction(action)) if action == "MERGE"
        ));
        assert!(matches!(
            parse(json!({ "action": "" })),
            Err(ReviewFormError::Validation(_))
        ));
    }

    #[test]
    fn non_positive_ids_are_type_errors() {
        let result = parse(json!({
            "action": "CREATE_NEW",
            "clean_data": { "title": "T", "brand_id": 0 }
        }));
        assert!(matches!(result, Err(ReviewFormError::TypeConstraint(_))));
    }
}
