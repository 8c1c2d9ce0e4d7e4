pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod seed;
pub mod user_repo;

pub use booking_repo::SqliteBookingRepository;
pub use catalog_repo::SqliteCatalogRepository;
pub use database::DbClient;
pub use user_repo::SqliteUserRepository;

use busline_core::CoreError;

/// All persistence errors surface as `CoreError::Storage`; the core never
/// retries on them.
pub(crate) fn storage_err(err: sqlx::Error) -> CoreError {
    CoreError::storage(err)
}
