/*
 * Responsibility
 * - /books 系 CRUD handler
 * - Path の :id は i32。parse できない値は axum の Path rejection で 400 になる
 *   (404 とは区別される)
 */
use axum::Json;
use axum::extract::{Path, State, rejection::JsonRejection};
use axum::http::StatusCode;

use crate::api::dto::books::{BookPayload, BookResponse};
use crate::error::AppError;
use crate::state::AppState;

fn decode_payload(
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<BookPayload, AppError> {
    let Json(req) =
        payload.map_err(|_| AppError::bad_request("INVALID_BODY", "invalid request body"))?;
    Ok(req)
}

pub async fn list_books(State(state): State<AppState>) -> Json<Vec<BookResponse>> {
    Json(state.books.list().into_iter().map(Into::into).collect())
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BookResponse>, AppError> {
    let book = state.books.get(id).ok_or(AppError::not_found("book"))?;
    Ok(Json(book.into()))
}

pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let req = decode_payload(payload)?;
    let book = state.books.create(&req.title, &req.category, &req.author);
    Ok(Json(book.into()))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let req = decode_payload(payload)?;
    let book = state
        .books
        .update(id, &req.title, &req.category, &req.author)
        .ok_or(AppError::not_found("book"))?;
    Ok(Json(book.into()))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if state.books.delete(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("book"))
    }
}
