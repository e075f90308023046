//! Wire shapes of the Shopify Admin GraphQL product listing.

use serde::{Deserialize, Serialize};

use crate::source::config::ShopifyAdapterConfig;

/// Product listing query with the configured page and child sizes inlined.
pub fn products_query(config: &ShopifyAdapterConfig) -> String {
    format!(
        r#"query getProducts($cursor: String) {{
  products(first: {page_size}, after: $cursor) {{
    pageInfo {{ hasNextPage endCursor }}
    edges {{
      node {{
        id
        title
        descriptionHtml
        vendor
        productType
        tags
        options {{ name values }}
        media(first: {media_first}) {{
          edges {{
            node {{
              id
              mediaContentType
              alt
              preview {{ image {{ url }} }}
              ... on MediaImage {{ image {{ url altText }} }}
            }}
          }}
        }}
        variants(first: {variants_first}) {{
          edges {{
            node {{
              id
              sku
              barcode
              price
              selectedOptions {{ name value }}
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
        page_size = config.page_size,
        media_first = config.media_first,
        variants_first = config.variants_first,
    )
}

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: ProductsVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct ProductsVariables<'a> {
    pub cursor: Option<&'a str>,
}

impl<'a> GraphqlRequest<'a> {
    pub fn products(query: &'a str, cursor: Option<&'a str>) -> Self {
        Self {
            query,
            variables: ProductsVariables { cursor },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphqlErrorExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorExtensions {
    pub code: Option<String>,
}

impl GraphqlError {
    /// Shopify reports cost-based throttling as a GraphQL error with HTTP 200.
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .is_some_and(|code| code == "THROTTLED")
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ProductConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnection {
    pub page_info: PageInfo,
    #[serde(default)]
    pub edges: Vec<Edge<ProductNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }
}

/// One product as returned by the listing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub description_html: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    pub media: Option<Connection<MediaNode>>,
    pub variants: Option<Connection<VariantNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductOption {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaNode {
    pub id: Option<String>,
    pub media_content_type: Option<String>,
    pub alt: Option<String>,
    pub preview: Option<MediaPreview>,
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaPreview {
    pub image: Option<ImageRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: Option<String>,
    pub alt_text: Option<String>,
}

impl MediaNode {
    /// Displayable URL: the image itself, or the preview frame for videos.
    pub fn display_url(&self) -> Option<&str> {
        let url = match self.media_content_type.as_deref() {
            Some("IMAGE") => self.image.as_ref().and_then(|i| i.url.as_deref()),
            Some("VIDEO") | Some("EXTERNAL_VIDEO") => self
                .preview
                .as_ref()
                .and_then(|p| p.image.as_ref())
                .and_then(|i| i.url.as_deref()),
            _ => None,
        };
        url.filter(|u| !u.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantNode {
    pub id: String,
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub price: String,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_inlines_configured_sizes() {
        let config = ShopifyAdapterConfig {
            page_size: 25,
            media_first: 5,
            variants_first: 7,
            ..ShopifyAdapterConfig::default()
        };
        let query = products_query(&config);
        assert!(query.contains("products(first: 25, after: $cursor)"));
        assert!(query.contains("media(first: 5)"));
        assert!(query.contains("variants(first: 7)"));
    }

    #[test]
    fn request_serializes_null_cursor() {
        let body = serde_json::to_value(GraphqlRequest::products("q", None)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "query": "q", "variables": { "cursor": null } })
        );
    }

    #[test]
    fn video_media_uses_preview_image() {
        let node: MediaNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/Video/1",
            "mediaContentType": "VIDEO",
            "alt": null,
            "preview": { "image": { "url": "https://cdn/preview.jpg" } }
        }))
        .unwrap();
        assert_eq!(node.display_url(), Some("https://cdn/preview.jpg"));
    }

    #[test]
    fn image_without_url_is_not_displayable() {
        let node: MediaNode = serde_json::from_value(serde_json::json!({
            "id": "gid://shopify/MediaImage/1",
            "mediaContentType": "IMAGE",
            "image": null
        }))
        .unwrap();
        assert_eq!(node.display_url(), None);
    }

    #[test]
    fn throttled_errors_are_recognised() {
        let response: GraphqlResponse<ProductsData> = serde_json::from_value(serde_json::json!({
            "errors": [{ "message": "Throttled", "extensions": { "code": "THROTTLED" } }]
        }))
        .unwrap();
        let errors = response.errors.unwrap();
        assert!(errors[0].is_throttled());
        assert!(response.data.is_none());
    }
}
