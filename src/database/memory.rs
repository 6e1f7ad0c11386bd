use super::SheetBackend;
use crate::utils::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tab {
    title: String,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct Book {
    tabs: Vec<Tab>,
}

impl Book {
    fn tab(&self, title: &str) -> Result<&Tab, AppError> {
        self.tabs
            .iter()
            .find(|t| t.title == title)
            .ok_or_else(|| AppError::Store(format!("tab '{}' does not exist", title)))
    }

    fn tab_mut(&mut self, title: &str) -> Result<&mut Tab, AppError> {
        self.tabs
            .iter_mut()
            .find(|t| t.title == title)
            .ok_or_else(|| AppError::Store(format!("tab '{}' does not exist", title)))
    }
}

/// Spreadsheet store kept in process memory
#[derive(Default)]
pub struct MemoryBackend {
    books: RwLock<HashMap<String, Book>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing_book(book_id: &str) -> AppError {
    AppError::Store(format!("spreadsheet '{}' does not exist", book_id))
}

fn new_tab(title: &str, header: &[&str]) -> Tab {
    Tab {
        title: title.to_string(),
        header: header.iter().map(|h| h.to_string()).collect(),
        rows: Vec::new(),
    }
}

#[async_trait]
impl SheetBackend for MemoryBackend {
    async fn create_book(&self, _title: &str, tab: &str, header: &[&str]) -> Result<String, AppError> {
        let id = Uuid::new_v4().simple().to_string();
        let book = Book {
            tabs: vec![new_tab(tab, header)],
        };
        self.books.write().await.insert(id.clone(), book);
        Ok(id)
    }

    async fn delete_book(&self, book_id: &str) -> Result<(), AppError> {
        self.books
            .write()
            .await
            .remove(book_id)
            .map(|_| ())
            .ok_or_else(|| missing_book(book_id))
    }

    async fn list_tabs(&self, book_id: &str) -> Result<Vec<String>, AppError> {
        let books = self.books.read().await;
        let book = books.get(book_id).ok_or_else(|| missing_book(book_id))?;
        Ok(book.tabs.iter().map(|t| t.title.clone()).collect())
    }

    async fn create_tab(&self, book_id: &str, tab: &str, header: &[&str]) -> Result<(), AppError> {
        let mut books = self.books.write().await;
        let book = books.get_mut(book_id).ok_or_else(|| missing_book(book_id))?;
        if !book.tabs.iter().any(|t| t.title == tab) {
            book.tabs.push(new_tab(tab, header));
        }
        Ok(())
    }

    async fn delete_tab(&self, book_id: &str, tab: &str) -> Result<(), AppError> {
        let mut books = self.books.write().await;
        let book = books.get_mut(book_id).ok_or_else(|| missing_book(book_id))?;
        let before = book.tabs.len();
        book.tabs.retain(|t| t.title != tab);
        if book.tabs.len() == before {
            return Err(AppError::Store(format!("tab '{}' does not exist", tab)));
        }
        Ok(())
    }

    async fn read_rows(&self, book_id: &str, tab: &str) -> Result<Vec<Vec<String>>, AppError> {
        let books = self.books.read().await;
        let book = books.get(book_id).ok_or_else(|| missing_book(book_id))?;
        let tab = book.tab(tab)?;
        let width = tab.header.len();

        Ok(tab
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect())
    }

    async fn append_row(&self, book_id: &str, tab: &str, row: Vec<String>) -> Result<(), AppError> {
        let mut books = self.books.write().await;
        let book = books.get_mut(book_id).ok_or_else(|| missing_book(book_id))?;
        book.tab_mut(tab)?.rows.push(row);
        Ok(())
    }

    async fn update_row(&self, book_id: &str, tab: &str, index: usize, row: Vec<String>) -> Result<(), AppError> {
        let mut books = self.books.write().await;
        let book = books.get_mut(book_id).ok_or_else(|| missing_book(book_id))?;
        let slot = book
            .tab_mut(tab)?
            .rows
            .get_mut(index)
            .ok_or_else(|| AppError::Store(format!("row {} out of range in '{}'", index, tab)))?;
        *slot = row;
        Ok(())
    }

    async fn delete_row(&self, book_id: &str, tab: &str, index: usize) -> Result<(), AppError> {
        let mut books = self.books.write().await;
        let book = books.get_mut(book_id).ok_or_else(|| missing_book(book_id))?;
        let rows = &mut book.tab_mut(tab)?.rows;
        if index >= rows.len() {
            return Err(AppError::Store(format!("row {} out of range in '{}'", index, tab)));
        }
        rows.remove(index);
        Ok(())
    }
}
