use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::dto::{CreateBoardRequest, UpdateBoardRequest};
use crate::api::state::AppState;
use crate::domain::{Board, BoardWithCards, KanbanError};

pub async fn create_board(
    State(state): State<AppState>,
    Json(req): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<Board>), KanbanError> {
    let board = state.boards()?.create(req.title).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn get_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BoardWithCards>, KanbanError> {
    let board = state.boards()?.find_one(&id).await?;
    Ok(Json(board))
}

pub async fn update_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBoardRequest>,
) -> Result<Json<Board>, KanbanError> {
    let board = state.boards()?.update_title(&id, &req.updated_title).await?;
    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Board>, KanbanError> {
    let board = state.boards()?.remove(&id).await?;
    Ok(Json(board))
}
