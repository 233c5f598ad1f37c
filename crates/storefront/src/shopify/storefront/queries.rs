//! GraphQL operations for the Shopify Storefront API.
//!
//! Each operation is a unit struct implementing [`GraphQLQuery`] with a
//! sibling module holding its `Variables` and `ResponseData`, the same shape
//! `#[derive(GraphQLQuery)]` generates. Response records are raw wire data:
//! scalars stay strings until `conversions` validates them.

use std::sync::LazyLock;

use graphql_client::{GraphQLQuery, QueryBody};
use serde::{Deserialize, Serialize};

// =============================================================================
// Fragments
// =============================================================================

const IMAGE_FIELDS: &str = r"
fragment ImageFields on Image {
  url
  altText
}
";

const MONEY_FIELDS: &str = r"
fragment MoneyFields on MoneyV2 {
  amount
  currencyCode
}
";

const PRODUCT_FIELDS: &str = r"
fragment ProductFields on Product {
  id
  handle
  title
  description
  availableForSale
  options {
    name
    values
  }
  priceRange {
    minVariantPrice { ...MoneyFields }
    maxVariantPrice { ...MoneyFields }
  }
  images(first: $imageCount) {
    edges { node { ...ImageFields } }
  }
  variants(first: $variantCount) {
    edges {
      node {
        id
        title
        availableForSale
        selectedOptions { name value }
        price { ...MoneyFields }
        image { ...ImageFields }
      }
    }
  }
}
";

const CART_FIELDS: &str = r"
fragment CartFields on Cart {
  id
  checkoutUrl
  totalQuantity
  cost {
    subtotalAmount { ...MoneyFields }
    totalAmount { ...MoneyFields }
  }
  lines(first: 100) {
    edges {
      node {
        id
        quantity
        merchandise {
          __typename
          ... on ProductVariant {
            id
            title
            selectedOptions { name value }
            price { ...MoneyFields }
            product {
              title
              handle
              featuredImage { ...ImageFields }
            }
          }
        }
      }
    }
  }
}
";

const USER_ERROR_FIELDS: &str = r"
fragment UserErrorFields on CartUserError {
  field
  message
  code
}
";

// =============================================================================
// Wire Records
// =============================================================================

/// `{ edges { node } }` pagination wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyFields {
    /// Decimal scalar, serialized as a string.
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFields {
    pub url: String,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionFields {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductOptionFields {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFields {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    pub selected_options: Vec<SelectedOptionFields>,
    pub price: MoneyFields,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeFields {
    pub min_variant_price: MoneyFields,
    pub max_variant_price: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub available_for_sale: bool,
    pub options: Vec<ProductOptionFields>,
    pub price_range: PriceRangeFields,
    pub images: Connection<ImageFields>,
    pub variants: Connection<VariantFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCostFields {
    pub subtotal_amount: MoneyFields,
    pub total_amount: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProductFields {
    pub title: String,
    pub handle: String,
    pub featured_image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartVariantFields {
    pub id: String,
    pub title: String,
    pub selected_options: Vec<SelectedOptionFields>,
    pub price: MoneyFields,
    pub product: CartProductFields,
}

/// The `Merchandise` union. Only product variants are sold here.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum MerchandiseFields {
    ProductVariant(CartVariantFields),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartLineFields {
    pub id: String,
    /// `Int` on the wire; checked to be positive during conversion.
    pub quantity: i64,
    pub merchandise: MerchandiseFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartFields {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: i64,
    pub cost: CartCostFields,
    pub lines: Connection<CartLineFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserErrorFields {
    pub field: Option<Vec<String>>,
    pub message: String,
    pub code: Option<String>,
}

/// Payload shared by every cart mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub cart: Option<CartFields>,
    pub user_errors: Vec<UserErrorFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionFields {
    pub handle: String,
    pub title: String,
    pub image: Option<ImageFields>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummaryFields {
    pub id: String,
    pub available_for_sale: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinPriceRangeFields {
    pub min_variant_price: MoneyFields,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummaryFields {
    pub handle: String,
    pub title: String,
    pub price_range: MinPriceRangeFields,
    pub featured_image: Option<ImageFields>,
    pub variants: Connection<VariantSummaryFields>,
}

// =============================================================================
// Operations
// =============================================================================

/// Build a document from an operation and the fragments it spreads.
fn document(operation: &str, fragments: &[&str]) -> String {
    let mut doc = operation.to_string();
    for fragment in fragments {
        doc.push_str(fragment);
    }
    doc
}

macro_rules! operation {
    ($query:ident, $module:ident, $name:literal, $body:literal, [$($fragment:ident),*]) => {
        pub struct $query;

        impl GraphQLQuery for $query {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                static DOCUMENT: LazyLock<String> =
                    LazyLock::new(|| document($body, &[$($fragment),*]));
                QueryBody {
                    variables,
                    query: DOCUMENT.as_str(),
                    operation_name: $name,
                }
            }
        }
    };
}

operation!(
    GetProductByHandle,
    get_product_by_handle,
    "GetProductByHandle",
    r"
query GetProductByHandle($handle: String!, $imageCount: Int!, $variantCount: Int!) {
  product(handle: $handle) { ...ProductFields }
}
",
    [PRODUCT_FIELDS, MONEY_FIELDS, IMAGE_FIELDS]
);

pub mod get_product_by_handle {
    use super::{Deserialize, ProductFields, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub handle: String,
        pub image_count: i64,
        pub variant_count: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub product: Option<ProductFields>,
    }
}

operation!(
    GetCollections,
    get_collections,
    "GetCollections",
    r"
query GetCollections($first: Int!) {
  collections(first: $first) {
    edges { node { handle title image { ...ImageFields } } }
  }
}
",
    [IMAGE_FIELDS]
);

pub mod get_collections {
    use super::{CollectionFields, Connection, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collections: Connection<CollectionFields>,
    }
}

operation!(
    GetCollectionProducts,
    get_collection_products,
    "GetCollectionProducts",
    r"
query GetCollectionProducts($handle: String!, $first: Int!) {
  collection(handle: $handle) {
    handle
    title
    image { ...ImageFields }
    products(first: $first) {
      edges {
        node {
          handle
          title
          priceRange { minVariantPrice { ...MoneyFields } }
          featuredImage { ...ImageFields }
          variants(first: 1) { edges { node { id availableForSale } } }
        }
      }
    }
  }
}
",
    [MONEY_FIELDS, IMAGE_FIELDS]
);

pub mod get_collection_products {
    use super::{Connection, Deserialize, ImageFields, ProductSummaryFields, Serialize};

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub handle: String,
        pub first: i64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CollectionWithProducts {
        pub handle: String,
        pub title: String,
        pub image: Option<ImageFields>,
        pub products: Connection<ProductSummaryFields>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub collection: Option<CollectionWithProducts>,
    }
}

operation!(
    CreateCart,
    create_cart,
    "CreateCart",
    r"
mutation CreateCart($input: CartInput!) {
  cartCreate(input: $input) {
    cart { ...CartFields }
    userErrors { ...UserErrorFields }
  }
}
",
    [CART_FIELDS, MONEY_FIELDS, IMAGE_FIELDS, USER_ERROR_FIELDS]
);

pub mod create_cart {
    use super::{CartPayload, Deserialize, Serialize};
    use crate::shopify::types::CartLineInput;

    #[derive(Debug, Clone, Default, Serialize)]
    pub struct CartInput {
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub input: CartInput,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_create: Option<CartPayload>,
    }
}

operation!(
    GetCart,
    get_cart,
    "GetCart",
    r"
query GetCart($cartId: ID!) {
  cart(id: $cartId) { ...CartFields }
}
",
    [CART_FIELDS, MONEY_FIELDS, IMAGE_FIELDS]
);

pub mod get_cart {
    use super::{CartFields, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub cart: Option<CartFields>,
    }
}

operation!(
    AddToCart,
    add_to_cart,
    "AddToCart",
    r"
mutation AddToCart($cartId: ID!, $lines: [CartLineInput!]!) {
  cartLinesAdd(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { ...UserErrorFields }
  }
}
",
    [CART_FIELDS, MONEY_FIELDS, IMAGE_FIELDS, USER_ERROR_FIELDS]
);

pub mod add_to_cart {
    use super::{CartPayload, Deserialize, Serialize};
    use crate::shopify::types::CartLineInput;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_add: Option<CartPayload>,
    }
}

operation!(
    UpdateCartLines,
    update_cart_lines,
    "UpdateCartLines",
    r"
mutation UpdateCartLines($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
  cartLinesUpdate(cartId: $cartId, lines: $lines) {
    cart { ...CartFields }
    userErrors { ...UserErrorFields }
  }
}
",
    [CART_FIELDS, MONEY_FIELDS, IMAGE_FIELDS, USER_ERROR_FIELDS]
);

pub mod update_cart_lines {
    use super::{CartPayload, Deserialize, Serialize};
    use crate::shopify::types::CartLineUpdate;

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub lines: Vec<CartLineUpdate>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_update: Option<CartPayload>,
    }
}

operation!(
    RemoveFromCart,
    remove_from_cart,
    "RemoveFromCart",
    r"
mutation RemoveFromCart($cartId: ID!, $lineIds: [ID!]!) {
  cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
    cart { ...CartFields }
    userErrors { ...UserErrorFields }
  }
}
",
    [CART_FIELDS, MONEY_FIELDS, IMAGE_FIELDS, USER_ERROR_FIELDS]
);

pub mod remove_from_cart {
    use super::{CartPayload, Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub cart_id: String,
        pub line_ids: Vec<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub cart_lines_remove: Option<CartPayload>,
    }
}
