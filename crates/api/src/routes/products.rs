//! Catalog routes.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use bazaar_core::{CategoryId, Price, ProductId, UserId};

use super::extract::{ValidJson, ValidPath};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Product, ProductDraft};
use crate::state::AppState;

/// Body for creating or replacing a product.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default, alias = "imageURL")]
    pub image_url: String,
    #[serde(alias = "categoryID")]
    pub category_id: i32,
}

impl ProductRequest {
    /// Validate into the fields a seller may set.
    fn into_draft(self) -> Result<ProductDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }

        let price = Price::new(self.price).map_err(|e| AppError::Validation(e.to_string()))?;

        if self.category_id <= 0 {
            return Err(AppError::Validation(
                "category_id must be greater than 0".to_string(),
            ));
        }

        let draft = ProductDraft {
            name: name.to_owned(),
            description: self.description,
            price,
            image_url: self.image_url,
            category_id: CategoryId::new(self.category_id),
        };
        draft.check_lengths().map_err(AppError::Validation)?;
        Ok(draft)
    }
}

/// Product as returned to clients.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category_id: CategoryId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            category_id: product.category_id,
            user_id: product.seller_id,
            created_at: product.created_at,
        }
    }
}

fn respond_all(products: Vec<Product>) -> Json<Vec<ProductResponse>> {
    Json(products.into_iter().map(ProductResponse::from).collect())
}

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductResponse>>> {
    Ok(respond_all(state.products().list().await?))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<ProductId>,
) -> Result<Json<ProductResponse>> {
    Ok(Json(state.products().get(id).await?.into()))
}

/// List a seller's products.
#[instrument(skip(state))]
pub async fn by_user(
    State(state): State<AppState>,
    ValidPath(user_id): ValidPath<UserId>,
) -> Result<Json<Vec<ProductResponse>>> {
    Ok(respond_all(state.products().list_by_seller(user_id).await?))
}

/// Create a product owned by the caller.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidJson(body): ValidJson<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let draft = body.into_draft()?;
    let product = state.products().create(&user, &draft).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Replace a product the caller owns.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidPath(id): ValidPath<ProductId>,
    ValidJson(body): ValidJson<ProductRequest>,
) -> Result<Json<ProductResponse>> {
    let draft = body.into_draft()?;
    let product = state.products().update(&user, id, &draft).await?;
    Ok(Json(product.into()))
}

/// Delete a product the caller owns.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidPath(id): ValidPath<ProductId>,
) -> Result<StatusCode> {
    state.products().delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: &str) -> ProductRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accepts_snake_case_and_aliases() {
        let snake = request(r#"{"name":"X","price":10,"category_id":1}"#);
        let camel = request(r#"{"name":"X","price":10,"categoryID":1}"#);
        assert_eq!(snake.category_id, camel.category_id);
        assert!(snake.description.is_empty());
    }

    #[test]
    fn test_draft_validation() {
        assert!(request(r#"{"name":"X","price":10.5,"category_id":1}"#)
            .into_draft()
            .is_ok());
        assert!(matches!(
            request(r#"{"name":"  ","price":10,"category_id":1}"#).into_draft(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request(r#"{"name":"X","price":0,"category_id":1}"#).into_draft(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request(r#"{"name":"X","price":-3,"category_id":1}"#).into_draft(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request(r#"{"name":"X","price":10,"category_id":0}"#).into_draft(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_draft_rejects_values_the_columns_cannot_hold() {
        for json in [
            r#"{"name":"X","price":0.001,"category_id":1}"#,
            r#"{"name":"X","price":10.555,"category_id":1}"#,
            r#"{"name":"X","price":1e11,"category_id":1}"#,
        ] {
            assert!(
                matches!(request(json).into_draft(), Err(AppError::Validation(_))),
                "{json}"
            );
        }

        let long_name = format!(r#"{{"name":"{}","price":10,"category_id":1}}"#, "n".repeat(101));
        assert!(matches!(
            request(&long_name).into_draft(),
            Err(AppError::Validation(_))
        ));

        let long_description = format!(
            r#"{{"name":"X","description":"{}","price":10,"category_id":1}}"#,
            "d".repeat(256)
        );
        assert!(matches!(
            request(&long_description).into_draft(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_response_shape() {
        let product = Product {
            id: ProductId::new(3),
            name: "X".to_string(),
            description: String::new(),
            price: Price::new(Decimal::new(105, 1)).unwrap(),
            image_url: String::new(),
            category_id: CategoryId::new(1),
            seller_id: UserId::new(9),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(ProductResponse::from(product)).unwrap();
        assert_eq!(json["user_id"], 9);
        assert_eq!(json["category_id"], 1);
        assert_eq!(json["price"], 10.5);
    }
}
