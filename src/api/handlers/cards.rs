use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{ChangeColumnRequest, ReorderRequest, UpdateContentRequest};
use crate::api::AppState;
use crate::domain::{Card, KanbanError};

pub async fn create_card(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<(StatusCode, Json<Card>), KanbanError> {
    let card = state.cards()?.create(&board_id).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Card>, KanbanError> {
    let card = state
        .cards()?
        .find_one(&id)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Card {} not found", id)))?;
    Ok(Json(card))
}

pub async fn list_board_cards(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<Vec<Card>>, KanbanError> {
    let cards = state.cards()?.find_by_board(&board_id).await?;
    Ok(Json(cards))
}

pub async fn update_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateContentRequest>,
) -> Result<Json<Card>, KanbanError> {
    let card = state
        .cards()?
        .update_content(&id, &req.title, &req.description)
        .await?;
    Ok(Json(card))
}

pub async fn reorder_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Card>, KanbanError> {
    let card = state.cards()?.reorder(&id, req.new_order).await?;
    Ok(Json(card))
}

pub async fn change_column(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChangeColumnRequest>,
) -> Result<Json<Card>, KanbanError> {
    let card = state.cards()?.change_column(&id, req.new_column).await?;
    Ok(Json(card))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Card>, KanbanError> {
    let card = state.cards()?.remove(&id).await?;
    Ok(Json(card))
}
