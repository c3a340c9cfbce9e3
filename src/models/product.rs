//! Product catalog model with stock tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Upper bound (inclusive) of the low-stock tier.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Category reported for products without any category.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "product_gender")]
pub enum ProductGender {
    Male,
    Female,
    #[default]
    Unisex,
}

/// Stock tier derived from a product's stock level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockTier {
    #[serde(rename = "in stock", alias = "in_stock")]
    InStock,
    #[serde(rename = "low stock", alias = "low_stock")]
    LowStock,
    #[serde(rename = "out of stock", alias = "out_of_stock")]
    OutOfStock,
}

impl StockTier {
    pub fn from_stock(stock: i32) -> Self {
        if stock <= 0 {
            StockTier::OutOfStock
        } else if stock <= LOW_STOCK_THRESHOLD {
            StockTier::LowStock
        } else {
            StockTier::InStock
        }
    }

    /// SQL predicate over the `stock` column selecting this tier.
    pub fn sql_predicate(&self) -> String {
        match self {
            StockTier::InStock => format!("stock > {LOW_STOCK_THRESHOLD}"),
            StockTier::LowStock => format!("stock > 0 AND stock <= {LOW_STOCK_THRESHOLD}"),
            StockTier::OutOfStock => "stock = 0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub types: Vec<String>,
    pub gender: ProductGender,
    pub images: Vec<String>,
    pub is_new: bool,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub stock: i32,
    pub description: Vec<String>,
    pub instructions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// First category, used to bucket the product in statistics.
    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(UNCATEGORIZED)
    }
}

/// Product as returned by the API, with its derived stock status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockTier,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let stock_status = StockTier::from_stock(product.stock);
        Self {
            product,
            stock_status,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 100, message = "Product name is required and cannot be more than 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "A product must have a category"))]
    pub categories: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub gender: ProductGender,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, rename = "new")]
    pub is_new: bool,
    #[validate(range(min = 0.0, message = "Price must be above 0"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "Discount price must be above 0"))]
    pub discount_price: Option<f64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 100, message = "Product name is required and cannot be more than 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "A product must have a category"))]
    pub categories: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub gender: Option<ProductGender>,
    pub images: Option<Vec<String>>,
    #[serde(rename = "new")]
    pub is_new: Option<bool>,
    #[validate(range(min = 0.0, message = "Price must be above 0"))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0, message = "Discount price must be above 0"))]
    pub discount_price: Option<f64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    pub description: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
}

/// Body of `PATCH /products/{id}/stock`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateStock {
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
}

/// Query filters for the product list.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub gender: Option<ProductGender>,
    pub stock_status: Option<StockTier>,
    /// Column to sort by, `-` prefixed for descending.
    pub sort: Option<String>,
}

/// Distinct category with the number of products carrying it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
}
