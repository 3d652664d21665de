pub mod book_repo;
pub mod user_repo;
