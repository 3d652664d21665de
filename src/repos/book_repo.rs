/*
 * Responsibility
 * - in-memory 蔵書一覧と ID カウンタの所有
 * - 全 CRUD を単一 Mutex の中で行う (ID 採番と Vec 変更は read-modify-write)
 * - 生の Vec は外に出さない。操作だけを公開する
 */
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub author: String,
}

#[derive(Debug, Default)]
struct Catalog {
    books: Vec<Book>,
    id_counter: i32,
}

impl Catalog {
    fn next_id(&mut self) -> i32 {
        self.id_counter += 1;
        self.id_counter
    }
}

#[derive(Debug, Default)]
pub struct BookRepo {
    catalog: Mutex<Catalog>,
}

impl BookRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        let repo = Self::new();
        repo.create("Book 1", "Fiction", "Author 1");
        repo.create("Book 2", "Non-fiction", "Author 2");
        repo
    }

    // A panicked holder can't leave the catalog half-mutated (every write is
    // a single push/assign/remove), so recover the guard instead of poisoning
    // every later request.
    fn locked(&self) -> MutexGuard<'_, Catalog> {
        self.catalog.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> Vec<Book> {
        self.locked().books.clone()
    }

    pub fn get(&self, id: i32) -> Option<Book> {
        self.locked().books.iter().find(|b| b.id == id).cloned()
    }

    /// Insert with a server-assigned id. Ids are monotonic and never reused,
    /// even after deletes.
    pub fn create(&self, title: &str, category: &str, author: &str) -> Book {
        let mut catalog = self.locked();
        let book = Book {
            id: catalog.next_id(),
            title: title.to_string(),
            category: category.to_string(),
            author: author.to_string(),
        };
        catalog.books.push(book.clone());
        book
    }

    /// Full field replace; the path id wins over anything in the body.
    pub fn update(&self, id: i32, title: &str, category: &str, author: &str) -> Option<Book> {
        let mut catalog = self.locked();
        let book = catalog.books.iter_mut().find(|b| b.id == id)?;
        book.title = title.to_string();
        book.category = category.to_string();
        book.author = author.to_string();
        Some(book.clone())
    }

    /// Remove by id, preserving the order of the remaining books.
    pub fn delete(&self, id: i32) -> bool {
        let mut catalog = self.locked();
        match catalog.books.iter().position(|b| b.id == id) {
            Some(i) => {
                catalog.books.remove(i);
                true
            }
            None => false,
        }
    }
}
