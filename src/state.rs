/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::repos::{book_repo::BookRepo, user_repo::UserRepo};
use crate::services::auth::TokenService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub tokens: TokenService,
    pub users: Arc<UserRepo>,
    pub books: Arc<BookRepo>,
}

impl AppState {
    pub fn new(tokens: TokenService, users: UserRepo, books: BookRepo) -> Self {
        Self {
            tokens,
            users: Arc::new(users),
            books: Arc::new(books),
        }
    }
}
