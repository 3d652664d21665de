/*
 * Responsibility
 * - URL 構造を定義 (login / protected / books)
 * - Bearer が必要な範囲 (= /protected のみ) をここで決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::bearer_auth;
use crate::state::AppState;

use crate::api::handlers::{
    auth::{login, protected},
    books::{create_book, delete_book, get_book, list_books, update_book},
    root::root,
};

pub fn routes(state: AppState) -> Router<AppState> {
    // Book CRUD is intentionally left open, matching the system this
    // mirrors; only /protected sits behind the bearer gate.
    let gated = bearer_auth::apply(Router::new().route("/protected", get(protected)), state);

    Router::new()
        .route("/", get(root))
        .route("/login", post(login))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .merge(gated)
}
