//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and monetary constraints are enforced at the
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for i32 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                trim_and_require_non_empty(value, $field).map(Self)
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }
    };
}

macro_rules! non_negative_i64_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            Serialize,
            Deserialize,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Constructs a value that must be zero or greater.
            pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
                if value >= 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NegativeNumber($field))
                }
            }

            /// Returns the raw `i64` value.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i64> for $name {
            fn eq(&self, other: &i64) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Generates a persisted status enum with its canonical string form.
macro_rules! status_enum {
    ($name:ident, $doc:expr, $field:expr, { $($variant:ident => $text:expr),+ $(,)? }) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// String representation used in persistence.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        "{}: {other}",
                        $field
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

id_newtype!(
    MerchantId,
    "Unique identifier for a merchant.",
    "merchant_id"
);
id_newtype!(
    StagingProductId,
    "Unique identifier for a staging product.",
    "staging_id"
);
id_newtype!(
    StagingVariantId,
    "Unique identifier for a staging variant.",
    "staging_variant_id"
);
id_newtype!(
    StagingMediaId,
    "Unique identifier for a staging media item.",
    "staging_media_id"
);
id_newtype!(
    ProductId,
    "Unique identifier for a master product.",
    "product_id"
);
id_newtype!(
    VariantId,
    "Unique identifier for a master variant.",
    "variant_id"
);
id_newtype!(MediaId, "Unique identifier for a media row.", "media_id");
id_newtype!(BrandId, "Unique identifier for a brand.", "brand_id");
id_newtype!(
    CategoryId,
    "Unique identifier for a category.",
    "category_id"
);
id_newtype!(
    OfferId,
    "Unique identifier for a merchant offer.",
    "offer_id"
);

non_empty_string_newtype!(
    MerchantName,
    "Merchant display name enforcing non-empty values.",
    "merchant name"
);
non_empty_string_newtype!(
    ExternalProductId,
    "Identifier assigned to a product by the upstream storefront.",
    "external product id"
);
non_empty_string_newtype!(
    ProductTitle,
    "Product title enforcing non-empty values.",
    "title"
);
non_empty_string_newtype!(
    ProductSlug,
    "URL slug of a master product.",
    "slug"
);
non_empty_string_newtype!(
    InternalSku,
    "Catalog-wide SKU of a master variant.",
    "internal sku"
);
non_empty_string_newtype!(MediaUrl, "Location of an image or preview.", "media url");
non_empty_string_newtype!(
    CurrencyCode,
    "ISO currency code of an offer.",
    "currency code"
);

non_negative_i64_newtype!(
    PriceMinor,
    "Non-negative monetary amount in minor currency units.",
    "price"
);

status_enum!(
    StagingStatus,
    "Lifecycle state of a staging product awaiting curation.",
    "staging status",
    {
        Pending => "PENDING",
        NeedsReview => "NEEDS_REVIEW",
        PendingSync => "PENDING_SYNC",
        Processing => "PROCESSING",
        AutoMatched => "AUTO_MATCHED",
        Approved => "APPROVED",
        Rejected => "REJECTED",
    }
);

status_enum!(
    CatalogStatus,
    "Publication state of a master product or variant.",
    "catalog status",
    {
        Active => "ACTIVE",
        Inactive => "INACTIVE",
    }
);

status_enum!(
    OfferStatus,
    "Commercial state of a merchant offer.",
    "offer status",
    {
        Live => "LIVE",
        Paused => "PAUSED",
    }
);

impl StagingStatus {
    /// Statuses shown in the merchant "under review" tab.
    pub const UNDER_REVIEW: [StagingStatus; 5] = [
        StagingStatus::Pending,
        StagingStatus::PendingSync,
        StagingStatus::Processing,
        StagingStatus::AutoMatched,
        StagingStatus::NeedsReview,
    ];

    /// Statuses forming the admin review queue.
    pub const PENDING_REVIEW: [StagingStatus; 2] =
        [StagingStatus::Pending, StagingStatus::NeedsReview];

    /// A reviewer decision has been recorded for the record.
    pub const fn is_terminal(self) -> bool {
        matches!(self, StagingStatus::Approved | StagingStatus::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_non_empty_strings() {
        let value = ProductTitle::new("  Linen shirt  ").unwrap();
        assert_eq!(value.as_str(), "Linen shirt");
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = ProductId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("product_id"));
    }

    #[test]
    fn price_minor_allows_zero() {
        assert_eq!(PriceMinor::new(0).unwrap().get(), 0);
    }

    #[test]
    fn price_minor_rejects_negative_numbers() {
        assert_eq!(
            PriceMinor::new(-1).unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
    }

    #[test]
    fn staging_status_round_trips_persisted_form() {
        for status in [
            StagingStatus::Pending,
            StagingStatus::NeedsReview,
            StagingStatus::PendingSync,
            StagingStatus::Processing,
            StagingStatus::AutoMatched,
            StagingStatus::Approved,
            StagingStatus::Rejected,
        ] {
            assert_eq!(StagingStatus::try_from(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = StagingStatus::try_from("DONE").unwrap_err();
        assert_eq!(
            err,
            TypeConstraintError::InvalidValue("staging status: DONE".to_string())
        );
    }

    #[test]
    fn status_serializes_in_screaming_case() {
        let value = serde_json::to_value(StagingStatus::NeedsReview).unwrap();
        assert_eq!(value, serde_json::json!("NEEDS_REVIEW"));
    }

    #[test]
    fn only_decided_records_are_terminal() {
        assert!(StagingStatus::Approved.is_terminal());
        assert!(StagingStatus::Rejected.is_terminal());
        assert!(!StagingStatus::NeedsReview.is_terminal());
    }
}
