//! Catalog Module
//!
//! Authors, categories and books with the conventional REST surface:
//! index, store, show, update and destroy under `/api/{authors,categories,books}`.
//!
//! Every entity implements [`CatalogResource`]; the handlers in `handler.rs`
//! are written once against that trait and instantiated per entity in
//! `routes.rs`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use libreria::catalog;
//!
//! let app = Router::new()
//!     .nest("/api", catalog::routes())
//!     .with_state(app_state);
//!
//! // Use the store directly
//! let catalog = catalog::Catalog::new(db.connection());
//! let author = catalog.create_author("Jane Doe").await?;
//! ```

mod handler;
mod resource;
mod routes;
mod store;

pub use resource::CatalogResource;
pub use routes::routes;
pub use store::Catalog;
