use anyhow::Result;
use libsql::Connection;
use std::collections::HashMap;

use crate::model::{
    Author, AuthorInput, AuthorWithBooks, Book, BookInput, BookWithRelations, Category, CategoryInput,
    CategoryWithBooks,
};

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Row access for the three catalog tables, borrowed from the shared connection.
pub struct Catalog<'a> {
    conn: &'a Connection,
}

impl<'a> Catalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Authors
    // ========================================================================

    pub async fn create_author(&self, name: &str) -> Result<Author> {
        let query = r#"
            INSERT INTO authors (name)
            VALUES (?)
            RETURNING id, name, created_at, updated_at
        "#;

        let mut rows = self.conn.query(query, libsql::params![name]).await?;

        if let Some(row) = rows.next().await? {
            Ok(row_to_author(&row)?)
        } else {
            anyhow::bail!("Failed to create author")
        }
    }

    pub async fn get_author(&self, id: i64) -> Result<Option<Author>> {
        let query = "SELECT id, name, created_at, updated_at FROM authors WHERE id = ?";
        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_author(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        let query = "SELECT id, name, created_at, updated_at FROM authors ORDER BY id";
        let mut rows = self.conn.query(query, ()).await?;

        let mut authors = Vec::new();
        while let Some(row) = rows.next().await? {
            authors.push(row_to_author(&row)?);
        }
        Ok(authors)
    }

    pub async fn update_author(&self, id: i64, input: &AuthorInput) -> Result<Option<Author>> {
        if self.get_author(id).await?.is_none() {
            return Ok(None);
        }

        if let Some(name) = &input.name {
            let query = format!("UPDATE authors SET name = ?, updated_at = {NOW} WHERE id = ?");
            self.conn.execute(&query, libsql::params![name.as_str(), id]).await?;
        }

        self.get_author(id).await
    }

    pub async fn delete_author(&self, id: i64) -> Result<bool> {
        let result = self
            .conn
            .execute("DELETE FROM authors WHERE id = ?", libsql::params![id])
            .await?;
        Ok(result > 0)
    }

    pub async fn author_exists(&self, id: i64) -> Result<bool> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM authors WHERE id = ?", libsql::params![id])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn list_authors_with_books(&self) -> Result<Vec<AuthorWithBooks>> {
        let authors = self.list_authors().await?;
        let mut books = group_books(self.list_books().await?, |b| b.author_id);

        Ok(authors
            .into_iter()
            .map(|author| AuthorWithBooks {
                books: books.remove(&author.id).unwrap_or_default(),
                author,
            })
            .collect())
    }

    pub async fn get_author_with_books(&self, id: i64) -> Result<Option<AuthorWithBooks>> {
        let Some(author) = self.get_author(id).await? else {
            return Ok(None);
        };
        let books = self.list_books_where("author_id", id).await?;
        Ok(Some(AuthorWithBooks { author, books }))
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        let query = r#"
            INSERT INTO categories (name)
            VALUES (?)
            RETURNING id, name, created_at, updated_at
        "#;

        let mut rows = self.conn.query(query, libsql::params![name]).await?;

        if let Some(row) = rows.next().await? {
            Ok(row_to_category(&row)?)
        } else {
            anyhow::bail!("Failed to create category")
        }
    }

    pub async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let query = "SELECT id, name, created_at, updated_at FROM categories WHERE id = ?";
        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_category(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let query = "SELECT id, name, created_at, updated_at FROM categories ORDER BY id";
        let mut rows = self.conn.query(query, ()).await?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next().await? {
            categories.push(row_to_category(&row)?);
        }
        Ok(categories)
    }

    pub async fn update_category(&self, id: i64, input: &CategoryInput) -> Result<Option<Category>> {
        if self.get_category(id).await?.is_none() {
            return Ok(None);
        }

        if let Some(name) = &input.name {
            let query = format!("UPDATE categories SET name = ?, updated_at = {NOW} WHERE id = ?");
            self.conn.execute(&query, libsql::params![name.as_str(), id]).await?;
        }

        self.get_category(id).await
    }

    pub async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?", libsql::params![id])
            .await?;
        Ok(result > 0)
    }

    pub async fn category_exists(&self, id: i64) -> Result<bool> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM categories WHERE id = ?", libsql::params![id])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn list_categories_with_books(&self) -> Result<Vec<CategoryWithBooks>> {
        let categories = self.list_categories().await?;
        let mut books = group_books(self.list_books().await?, |b| b.category_id);

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithBooks {
                books: books.remove(&category.id).unwrap_or_default(),
                category,
            })
            .collect())
    }

    pub async fn get_category_with_books(&self, id: i64) -> Result<Option<CategoryWithBooks>> {
        let Some(category) = self.get_category(id).await? else {
            return Ok(None);
        };
        let books = self.list_books_where("category_id", id).await?;
        Ok(Some(CategoryWithBooks { category, books }))
    }

    // ========================================================================
    // Books
    // ========================================================================

    pub async fn create_book(&self, input: &BookInput) -> Result<Book> {
        let query = r#"
            INSERT INTO books (title, author_id, category_id)
            VALUES (?, ?, ?)
            RETURNING id, title, author_id, category_id, created_at, updated_at
        "#;

        let title = input.title.as_deref().unwrap_or_default();
        let author_id = input.author_id.flatten();
        let category_id = input.category_id.flatten();

        let mut rows = self
            .conn
            .query(query, libsql::params![title, author_id, category_id])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(row_to_book(&row)?)
        } else {
            anyhow::bail!("Failed to create book")
        }
    }

    pub async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let query = r#"
            SELECT id, title, author_id, category_id, created_at, updated_at
            FROM books WHERE id = ?
        "#;
        let mut rows = self.conn.query(query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_book(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list_books(&self) -> Result<Vec<Book>> {
        let query = r#"
            SELECT id, title, author_id, category_id, created_at, updated_at
            FROM books ORDER BY id
        "#;
        let mut rows = self.conn.query(query, ()).await?;

        let mut books = Vec::new();
        while let Some(row) = rows.next().await? {
            books.push(row_to_book(&row)?);
        }
        Ok(books)
    }

    async fn list_books_where(&self, column: &'static str, id: i64) -> Result<Vec<Book>> {
        let query = format!(
            "SELECT id, title, author_id, category_id, created_at, updated_at FROM books WHERE {column} = ? ORDER BY id"
        );
        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        let mut books = Vec::new();
        while let Some(row) = rows.next().await? {
            books.push(row_to_book(&row)?);
        }
        Ok(books)
    }

    pub async fn update_book(&self, id: i64, input: &BookInput) -> Result<Option<Book>> {
        if self.get_book(id).await?.is_none() {
            return Ok(None);
        }

        let touch = format!("updated_at = {NOW}");
        let mut updates: Vec<&str> = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(title) = &input.title {
            updates.push("title = ?");
            params.push(title.clone().into());
        }
        if let Some(author_id) = input.author_id {
            updates.push("author_id = ?");
            params.push(nullable(author_id));
        }
        if let Some(category_id) = input.category_id {
            updates.push("category_id = ?");
            params.push(nullable(category_id));
        }

        if updates.is_empty() {
            return self.get_book(id).await;
        }

        updates.push(&touch);
        params.push(id.into());

        let query = format!("UPDATE books SET {} WHERE id = ?", updates.join(", "));

        self.conn.execute(&query, params).await?;
        self.get_book(id).await
    }

    pub async fn book_exists(&self, id: i64) -> Result<bool> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM books WHERE id = ?", libsql::params![id])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn delete_book(&self, id: i64) -> Result<bool> {
        let result = self
            .conn
            .execute("DELETE FROM books WHERE id = ?", libsql::params![id])
            .await?;
        Ok(result > 0)
    }

    pub async fn list_books_with_relations(&self) -> Result<Vec<BookWithRelations>> {
        let authors: HashMap<i64, Author> =
            self.list_authors().await?.into_iter().map(|a| (a.id, a)).collect();
        let categories: HashMap<i64, Category> =
            self.list_categories().await?.into_iter().map(|c| (c.id, c)).collect();

        Ok(self
            .list_books()
            .await?
            .into_iter()
            .map(|book| BookWithRelations {
                author: book.author_id.and_then(|id| authors.get(&id).cloned()),
                category: book.category_id.and_then(|id| categories.get(&id).cloned()),
                book,
            })
            .collect())
    }

    pub async fn get_book_with_relations(&self, id: i64) -> Result<Option<BookWithRelations>> {
        let Some(book) = self.get_book(id).await? else {
            return Ok(None);
        };

        let author = match book.author_id {
            Some(author_id) => self.get_author(author_id).await?,
            None => None,
        };
        let category = match book.category_id {
            Some(category_id) => self.get_category(category_id).await?,
            None => None,
        };

        Ok(Some(BookWithRelations { book, author, category }))
    }
}

fn nullable(id: Option<i64>) -> libsql::Value {
    match id {
        Some(id) => libsql::Value::Integer(id),
        None => libsql::Value::Null,
    }
}

fn group_books(books: Vec<Book>, key: impl Fn(&Book) -> Option<i64>) -> HashMap<i64, Vec<Book>> {
    let mut grouped: HashMap<i64, Vec<Book>> = HashMap::new();
    for book in books {
        if let Some(owner) = key(&book) {
            grouped.entry(owner).or_default().push(book);
        }
    }
    grouped
}

fn row_to_author(row: &libsql::Row) -> Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn row_to_category(row: &libsql::Row) -> Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn row_to_book(row: &libsql::Row) -> Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author_id: row.get::<Option<i64>>(2)?,
        category_id: row.get::<Option<i64>>(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
