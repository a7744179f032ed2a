//! In-memory book collection.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use shelf_kernel::settings::{BooksSettings, IdStrategy};
use time::OffsetDateTime;
use tokio::sync::Mutex;

use super::error::BookError;
use super::models::{Book, BookId, CreateBook, UpdateBook};

/// Shared handle to the process-wide book collection.
///
/// Clones share the same collection. Every operation holds the lock for its
/// whole scan and mutation, so operations never interleave.
#[derive(Clone)]
pub struct BookStore {
    shelf: Arc<Mutex<Shelf>>,
}

struct Shelf {
    books: Vec<Book>,
    strategy: IdStrategy,
    next_id: u64,
}

impl Shelf {
    fn assign_id(&mut self) -> BookId {
        match self.strategy {
            IdStrategy::Length => BookId(self.books.len() as u64 + 1),
            IdStrategy::Sequence => {
                let id = BookId(self.next_id);
                self.next_id += 1;
                id
            }
        }
    }

    fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }
}

impl BookStore {
    /// Empty collection.
    pub fn new(strategy: IdStrategy) -> Self {
        Self::from_shelf(Shelf {
            books: Vec::new(),
            strategy,
            next_id: 1,
        })
    }

    /// Collection pre-filled with `books`, kept in the given order.
    ///
    /// Fails when the largest seeded id leaves no room for the next one.
    pub fn with_books(books: Vec<Book>, strategy: IdStrategy) -> anyhow::Result<Self> {
        let largest = books.iter().map(|book| book.id.0).max().unwrap_or(0);
        let next_id = largest
            .checked_add(1)
            .ok_or_else(|| anyhow!("seeded book id {largest} leaves no room for new ids"))?;

        Ok(Self::from_shelf(Shelf {
            books,
            strategy,
            next_id,
        }))
    }

    fn from_shelf(shelf: Shelf) -> Self {
        Self {
            shelf: Arc::new(Mutex::new(shelf)),
        }
    }

    /// Build the store described by the `books` settings section.
    pub fn from_settings(settings: &BooksSettings) -> anyhow::Result<Self> {
        let books = match &settings.seed_path {
            Some(path) => load_seed(path)?,
            None => Vec::new(),
        };
        Self::with_books(books, settings.id_strategy).context("invalid book seed")
    }

    /// Every book in insertion order.
    pub async fn list(&self) -> Vec<Book> {
        self.shelf.lock().await.books.clone()
    }

    pub async fn len(&self) -> usize {
        self.shelf.lock().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// First book whose id equals `id`.
    pub async fn get(&self, id: BookId) -> Result<Book, BookError> {
        let shelf = self.shelf.lock().await;
        shelf
            .books
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| BookError::not_found(id))
    }

    /// Append a new book stamped with the current time.
    pub async fn create(&self, draft: CreateBook) -> Book {
        let mut shelf = self.shelf.lock().await;
        let id = shelf.assign_id();
        let book = Book::new(id, draft, OffsetDateTime::now_utc());
        shelf.books.push(book.clone());
        book
    }

    /// Replace the book in place with `changes` applied; returns the new record.
    pub async fn update(&self, id: BookId, changes: UpdateBook) -> Result<Book, BookError> {
        let mut shelf = self.shelf.lock().await;
        let index = shelf.position(id).ok_or_else(|| BookError::not_found(id))?;
        let updated = shelf.books[index].patched(changes);
        shelf.books[index] = updated.clone();
        Ok(updated)
    }

    /// Remove the book; later books keep their relative order.
    pub async fn delete(&self, id: BookId) -> Result<Book, BookError> {
        let mut shelf = self.shelf.lock().await;
        let index = shelf.position(id).ok_or_else(|| BookError::not_found(id))?;
        Ok(shelf.books.remove(index))
    }
}

impl Default for BookStore {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

/// Read a JSON array of books.
pub fn load_seed(path: &Path) -> anyhow::Result<Vec<Book>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read book seed {}", path.display()))?;
    let books: Vec<Book> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse book seed {}", path.display()))?;

    tracing::info!(path = %path.display(), count = books.len(), "loaded book seed");
    Ok(books)
}
