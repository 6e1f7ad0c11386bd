// ==================== SPREADSHEET STORE ====================
// Tabs of a spreadsheet act as tables: row 1 is the header, every other row
// is a record. Row indexes handed around here are 0-based over data rows.

pub mod google_auth;
pub mod google_sheets;
pub mod memory;

use crate::{
    config::{AppConfig, StoreBackend},
    models::{COMPANIES_TAB, COMPANY_HEADER},
    utils::error::AppError,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

pub use google_sheets::GoogleSheets;
pub use memory::MemoryBackend;

#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// Creates a new spreadsheet whose first tab is `tab` with `header`.
    async fn create_book(&self, title: &str, tab: &str, header: &[&str]) -> Result<String, AppError>;

    async fn delete_book(&self, book_id: &str) -> Result<(), AppError>;

    async fn list_tabs(&self, book_id: &str) -> Result<Vec<String>, AppError>;

    /// Does nothing when the tab already exists.
    async fn create_tab(&self, book_id: &str, tab: &str, header: &[&str]) -> Result<(), AppError>;

    async fn delete_tab(&self, book_id: &str, tab: &str) -> Result<(), AppError>;

    /// Data rows (header excluded), each padded to the header width.
    async fn read_rows(&self, book_id: &str, tab: &str) -> Result<Vec<Vec<String>>, AppError>;

    async fn append_row(&self, book_id: &str, tab: &str, row: Vec<String>) -> Result<(), AppError>;

    async fn update_row(&self, book_id: &str, tab: &str, index: usize, row: Vec<String>) -> Result<(), AppError>;

    async fn delete_row(&self, book_id: &str, tab: &str, index: usize) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct Database {
    backend: Arc<dyn SheetBackend>,
    root_sheet_id: String,
    write_lock: Arc<Mutex<()>>,
}

impl Database {
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        let db = match config.store_backend {
            StoreBackend::Google => {
                let google = config
                    .google
                    .as_ref()
                    .ok_or_else(|| AppError::Config("Google Sheets settings missing".to_string()))?;
                let backend = GoogleSheets::new(google)?;
                Self::with_backend(Arc::new(backend), &google.root_sheet_id)
            }
            StoreBackend::Memory => {
                log::warn!("⚠️  Using in-memory store, data is lost on restart");
                let backend = MemoryBackend::new();
                let root = backend.create_book("root", COMPANIES_TAB, &COMPANY_HEADER).await?;
                Self::with_backend(Arc::new(backend), &root)
            }
        };

        db.ensure_schema().await?;

        Ok(db)
    }

    pub fn with_backend(backend: Arc<dyn SheetBackend>, root_sheet_id: &str) -> Self {
        Self {
            backend,
            root_sheet_id: root_sheet_id.to_string(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates the tabs the service expects in the root spreadsheet
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        log::info!("🔧 Checking spreadsheet schema...");

        let tabs = self.backend.list_tabs(&self.root_sheet_id).await?;
        if tabs.iter().any(|t| t == COMPANIES_TAB) {
            log::info!("   ℹ️  Tab already exists: {}", COMPANIES_TAB);
        } else {
            self.backend
                .create_tab(&self.root_sheet_id, COMPANIES_TAB, &COMPANY_HEADER)
                .await?;
            log::info!("   ✅ Tab created: {}", COMPANIES_TAB);
        }

        log::info!("✅ Spreadsheet schema ready");
        Ok(())
    }

    pub fn sheets(&self) -> &dyn SheetBackend {
        self.backend.as_ref()
    }

    pub fn root_sheet_id(&self) -> &str {
        &self.root_sheet_id
    }

    /// Serializes read-modify-write sequences (duplicate checks, row index
    /// lookups followed by updates) within this process.
    pub async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// First row of `tab` matching `predicate`, with its data-row index.
    pub async fn find_row<F>(
        &self,
        book_id: &str,
        tab: &str,
        predicate: F,
    ) -> Result<Option<(usize, Vec<String>)>, AppError>
    where
        F: Fn(&[String]) -> bool,
    {
        let rows = self.backend.read_rows(book_id, tab).await?;
        Ok(rows.into_iter().enumerate().find(|(_, row)| predicate(row)))
    }
}
