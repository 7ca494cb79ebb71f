//! Library book inventory persisted as versioned JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Current on-disk schema version.
pub const INVENTORY_VERSION: u32 = 1;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("No book with ISBN {0}")]
    NotFound(String),

    #[error("Book {0} is already issued")]
    AlreadyIssued(String),

    #[error("Book {0} is not issued")]
    NotIssued(String),

    #[error("Book {0} must not be empty")]
    EmptyField(&'static str),

    #[error("Unsupported inventory version {0}")]
    UnsupportedVersion(u32),

    #[error("Failed to access inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse inventory: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;

// ── Book ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Available,
    Issued,
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookStatus::Available => write!(f, "available"),
            BookStatus::Issued => write!(f, "issued"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub status: BookStatus,
}

impl Book {
    pub fn new(title: &str, author: &str, isbn: &str) -> Result<Self> {
        let field = |value: &str, name: &'static str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(InventoryError::EmptyField(name))
            } else {
                Ok(trimmed.to_string())
            }
        };
        Ok(Self {
            title: field(title, "title")?,
            author: field(author, "author")?,
            isbn: field(isbn, "isbn")?,
            status: BookStatus::Available,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == BookStatus::Available
    }

    pub fn issue(&mut self) -> Result<()> {
        if !self.is_available() {
            return Err(InventoryError::AlreadyIssued(self.isbn.clone()));
        }
        self.status = BookStatus::Issued;
        Ok(())
    }

    pub fn return_book(&mut self) -> Result<()> {
        if self.is_available() {
            return Err(InventoryError::NotIssued(self.isbn.clone()));
        }
        self.status = BookStatus::Available;
        Ok(())
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Title: {} | Author: {} | ISBN: {} | Status: {}",
            self.title, self.author, self.isbn, self.status
        )
    }
}

// ── LibraryInventory ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct InventoryFile {
    version: u32,
    books: Vec<Book>,
}

/// The set of books backed by one JSON file. A mutation is applied in
/// memory only after it has been written to disk.
#[derive(Debug)]
pub struct LibraryInventory {
    path: PathBuf,
    books: Vec<Book>,
}

impl LibraryInventory {
    /// Load the inventory at `path`; a missing file is an empty inventory.
    pub fn open(path: &Path) -> Result<Self> {
        let books = match std::fs::read_to_string(path) {
            Ok(content) => {
                let file: InventoryFile = serde_json::from_str(&content)?;
                if file.version != INVENTORY_VERSION {
                    return Err(InventoryError::UnsupportedVersion(file.version));
                }
                file.books
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Inventory {} not found, starting empty", path.display());
                Vec::new()
            }
            Err(source) => {
                return Err(InventoryError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            books,
        })
    }

    /// Write `books` to the inventory file via a temp file and rename.
    fn write_books(&self, books: &[Book]) -> Result<()> {
        let io_err = |source: std::io::Error| InventoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&InventoryFile {
            version: INVENTORY_VERSION,
            books: books.to_vec(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Persist `books` and adopt them only once the write succeeded.
    fn commit(&mut self, books: Vec<Book>) -> Result<()> {
        self.write_books(&books)?;
        self.books = books;
        Ok(())
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn search_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.isbn == isbn.trim())
    }

    /// Books whose title contains `query`, ignoring case.
    pub fn search_by_title(&self, query: &str) -> Vec<&Book> {
        let needle = query.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn add_book(&mut self, title: &str, author: &str, isbn: &str) -> Result<&Book> {
        let book = Book::new(title, author, isbn)?;
        if self.search_by_isbn(&book.isbn).is_some() {
            return Err(InventoryError::DuplicateIsbn(book.isbn));
        }
        let mut books = self.books.clone();
        books.push(book);
        self.commit(books)?;
        Ok(&self.books[self.books.len() - 1])
    }

    pub fn issue_book(&mut self, isbn: &str) -> Result<()> {
        self.update_book(isbn, Book::issue)
    }

    pub fn return_book(&mut self, isbn: &str) -> Result<()> {
        self.update_book(isbn, Book::return_book)
    }

    fn update_book(&mut self, isbn: &str, change: impl FnOnce(&mut Book) -> Result<()>) -> Result<()> {
        let isbn = isbn.trim();
        let mut books = self.books.clone();
        let book = books
            .iter_mut()
            .find(|b| b.isbn == isbn)
            .ok_or_else(|| InventoryError::NotFound(isbn.to_string()))?;
        change(book)?;
        self.commit(books)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
