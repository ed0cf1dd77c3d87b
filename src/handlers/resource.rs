//! Resource CRUD handlers: index, show, create, update, destroy.
//! Every write returns the single affected item.

use crate::collection::Document;
use crate::error::AppError;
use crate::state::ResourceState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

fn parse_id(id_str: &str) -> Result<String, AppError> {
    let u = uuid::Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))?;
    Ok(u.to_string())
}

fn body_to_document(value: Value) -> Result<Document, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

pub async fn index(State(state): State<ResourceState>) -> Result<impl IntoResponse, AppError> {
    let items = state.collection.find_all().await?;
    Ok((StatusCode::OK, Json(items)))
}

pub async fn show(
    State(state): State<ResourceState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let item = state
        .collection
        .find_one(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {}", id_str)))?;
    Ok((StatusCode::OK, Json(item)))
}

pub async fn create(
    State(state): State<ResourceState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let doc = body_to_document(body)?;
    let item = state.collection.insert(doc).await?;
    tracing::debug!(backend = state.collection.backend(), "item created");
    Ok((StatusCode::OK, Json(item)))
}

pub async fn update(
    State(state): State<ResourceState>,
    Path(id_str): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let doc = body_to_document(body)?;
    let item = state
        .collection
        .replace(&id, doc)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {}", id_str)))?;
    Ok((StatusCode::OK, Json(item)))
}

pub async fn destroy(
    State(state): State<ResourceState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let item = state
        .collection
        .remove(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {}", id_str)))?;
    Ok((StatusCode::OK, Json(item)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_must_be_uuids() {
        assert!(matches!(parse_id("0"), Err(AppError::BadRequest(_))));
        let id = "6F9619FF-8B86-D011-B42D-00C04FC964FF";
        assert_eq!(parse_id(id).unwrap(), id.to_lowercase());
    }

    #[test]
    fn bodies_must_be_objects() {
        assert!(body_to_document(json!({ "name": "Chai" })).is_ok());
        assert!(body_to_document(json!([1, 2])).is_err());
        assert!(body_to_document(Value::Null).is_err());
    }
}
