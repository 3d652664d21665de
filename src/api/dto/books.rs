/*
 * Responsibility
 * - Books の request/response DTO
 *
 * Notes
 * - request に `id` が来ても無視する (serde が未知フィールドとして捨てる)。
 *   id は常にサーバ採番 / path 由来
 * - 空文字列フィールドはそのまま許容 (validation は掛けない)
 */
use serde::{Deserialize, Serialize};

use crate::repos::book_repo::Book;

#[derive(Debug, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub category: String,
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub author: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            category: book.category,
            author: book.author,
        }
    }
}
