use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;

use super::Catalog;
use crate::error::{ApiError, ValidationErrors, is_foreign_key_violation};
use crate::model::{
    Author, AuthorInput, AuthorWithBooks, Book, BookInput, BookWithRelations, Category, CategoryInput,
    CategoryWithBooks,
};

/// One entity's CRUD surface, shared by the generic handlers in `handler.rs`.
///
/// `Record` is what store and update return, `Detail` is the eagerly loaded
/// form returned by index and show.
pub trait CatalogResource: Send + Sync + 'static {
    /// Path segment under `/api`.
    const COLLECTION: &'static str;
    /// Human readable name used in not-found messages and logs.
    const LABEL: &'static str;

    type Record: Serialize + Send;
    type Detail: Serialize + Send;
    type Input: DeserializeOwned + Send + 'static;

    fn validate_store(input: &Self::Input) -> ValidationErrors;

    fn validate_update(input: &Self::Input) -> ValidationErrors;

    fn list(catalog: &Catalog<'_>) -> impl Future<Output = Result<Vec<Self::Detail>, ApiError>> + Send;

    fn exists(catalog: &Catalog<'_>, id: i64) -> impl Future<Output = Result<bool, ApiError>> + Send;

    fn find(catalog: &Catalog<'_>, id: i64) -> impl Future<Output = Result<Option<Self::Detail>, ApiError>> + Send;

    fn create(catalog: &Catalog<'_>, input: Self::Input) -> impl Future<Output = Result<Self::Record, ApiError>> + Send;

    fn update(
        catalog: &Catalog<'_>,
        id: i64,
        input: Self::Input,
    ) -> impl Future<Output = Result<Option<Self::Record>, ApiError>> + Send;

    fn delete(catalog: &Catalog<'_>, id: i64) -> impl Future<Output = Result<bool, ApiError>> + Send;
}

fn require(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if value.is_none_or(str::is_empty) {
        errors.add(field, format!("The {field} field is required."));
    }
}

// Present fields may not be blanked on update, absent ones are left alone.
fn forbid_blank(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if value.is_some_and(str::is_empty) {
        errors.add(field, format!("The {field} field must not be empty."));
    }
}

impl CatalogResource for Author {
    const COLLECTION: &'static str = "authors";
    const LABEL: &'static str = "Author";

    type Record = Author;
    type Detail = AuthorWithBooks;
    type Input = AuthorInput;

    fn validate_store(input: &AuthorInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", input.name.as_deref());
        errors
    }

    fn validate_update(input: &AuthorInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        forbid_blank(&mut errors, "name", input.name.as_deref());
        errors
    }

    async fn list(catalog: &Catalog<'_>) -> Result<Vec<AuthorWithBooks>, ApiError> {
        Ok(catalog.list_authors_with_books().await?)
    }

    async fn exists(catalog: &Catalog<'_>, id: i64) -> Result<bool, ApiError> {
        Ok(catalog.author_exists(id).await?)
    }

    async fn find(catalog: &Catalog<'_>, id: i64) -> Result<Option<AuthorWithBooks>, ApiError> {
        Ok(catalog.get_author_with_books(id).await?)
    }

    async fn create(catalog: &Catalog<'_>, input: AuthorInput) -> Result<Author, ApiError> {
        Ok(catalog.create_author(input.name.as_deref().unwrap_or_default()).await?)
    }

    async fn update(catalog: &Catalog<'_>, id: i64, input: AuthorInput) -> Result<Option<Author>, ApiError> {
        Ok(catalog.update_author(id, &input).await?)
    }

    async fn delete(catalog: &Catalog<'_>, id: i64) -> Result<bool, ApiError> {
        Ok(catalog.delete_author(id).await?)
    }
}

impl CatalogResource for Category {
    const COLLECTION: &'static str = "categories";
    const LABEL: &'static str = "Category";

    type Record = Category;
    type Detail = CategoryWithBooks;
    type Input = CategoryInput;

    fn validate_store(input: &CategoryInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", input.name.as_deref());
        errors
    }

    fn validate_update(input: &CategoryInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        forbid_blank(&mut errors, "name", input.name.as_deref());
        errors
    }

    async fn list(catalog: &Catalog<'_>) -> Result<Vec<CategoryWithBooks>, ApiError> {
        Ok(catalog.list_categories_with_books().await?)
    }

    async fn exists(catalog: &Catalog<'_>, id: i64) -> Result<bool, ApiError> {
        Ok(catalog.category_exists(id).await?)
    }

    async fn find(catalog: &Catalog<'_>, id: i64) -> Result<Option<CategoryWithBooks>, ApiError> {
        Ok(catalog.get_category_with_books(id).await?)
    }

    async fn create(catalog: &Catalog<'_>, input: CategoryInput) -> Result<Category, ApiError> {
        Ok(catalog.create_category(input.name.as_deref().unwrap_or_default()).await?)
    }

    async fn update(catalog: &Catalog<'_>, id: i64, input: CategoryInput) -> Result<Option<Category>, ApiError> {
        Ok(catalog.update_category(id, &input).await?)
    }

    async fn delete(catalog: &Catalog<'_>, id: i64) -> Result<bool, ApiError> {
        Ok(catalog.delete_category(id).await?)
    }
}

impl CatalogResource for Book {
    const COLLECTION: &'static str = "books";
    const LABEL: &'static str = "Book";

    type Record = Book;
    type Detail = BookWithRelations;
    type Input = BookInput;

    fn validate_store(input: &BookInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "title", input.title.as_deref());
        errors
    }

    fn validate_update(input: &BookInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        forbid_blank(&mut errors, "title", input.title.as_deref());
        errors
    }

    async fn list(catalog: &Catalog<'_>) -> Result<Vec<BookWithRelations>, ApiError> {
        Ok(catalog.list_books_with_relations().await?)
    }

    async fn exists(catalog: &Catalog<'_>, id: i64) -> Result<bool, ApiError> {
        Ok(catalog.book_exists(id).await?)
    }

    async fn find(catalog: &Catalog<'_>, id: i64) -> Result<Option<BookWithRelations>, ApiError> {
        Ok(catalog.get_book_with_relations(id).await?)
    }

    async fn create(catalog: &Catalog<'_>, input: BookInput) -> Result<Book, ApiError> {
        match catalog.create_book(&input).await {
            Ok(book) => Ok(book),
            Err(e) if is_foreign_key_violation(&e) => Err(dangling_references(catalog, &input).await),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(catalog: &Catalog<'_>, id: i64, input: BookInput) -> Result<Option<Book>, ApiError> {
        match catalog.update_book(id, &input).await {
            Ok(book) => Ok(book),
            Err(e) if is_foreign_key_violation(&e) => Err(dangling_references(catalog, &input).await),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(catalog: &Catalog<'_>, id: i64) -> Result<bool, ApiError> {
        Ok(catalog.delete_book(id).await?)
    }
}

/// Works out which foreign key the storage layer refused.
async fn dangling_references(catalog: &Catalog<'_>, input: &BookInput) -> ApiError {
    let mut errors = ValidationErrors::new();

    if let Some(Some(author_id)) = input.author_id {
        match catalog.author_exists(author_id).await {
            Ok(true) => {}
            Ok(false) => errors.add("author_id", "The selected author_id is invalid."),
            Err(e) => return e.into(),
        }
    }
    if let Some(Some(category_id)) = input.category_id {
        match catalog.category_exists(category_id).await {
            Ok(true) => {}
            Ok(false) => errors.add("category_id", "The selected category_id is invalid."),
            Err(e) => return e.into(),
        }
    }

    errors.into()
}
