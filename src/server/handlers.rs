use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::Identity;
use crate::coordinator::{Compression, RecipeRequest};
use crate::error::CoordinatorError;
use crate::AppState;

pub async fn root() -> &'static str {
    "OK"
}

pub async fn hello(Path(name): Path<String>) -> String {
    format!("Hello, Cookbook user {name}!")
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeBody {
    pub url: String,
    pub html: Option<String>,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeQuery {
    pub compression: Option<String>,
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<CreateRecipeQuery>,
    Json(body): Json<CreateRecipeBody>,
) -> Result<Json<crate::coordinator::RecipeResponse>, CoordinatorError> {
    let request = RecipeRequest {
        identity: identity.0,
        url: body.url,
        html: body.html,
        compression: Compression::from_query(query.compression.as_deref()),
        title: body.title,
    };

    let response = state.coordinator.handle(request).await?;
    Ok(Json(response))
}
