//! HTTP handlers for the books module.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shelf_http::extract::LenientJson;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::error::BookError;
use super::models::{Book, BookId, CreateBook, UpdateBook};
use super::store::BookStore;

#[derive(OpenApi)]
#[openapi(
    tags((name = "Books", description = "API to manage your books.")),
    components(schemas(Book, CreateBook, UpdateBook))
)]
struct BooksApi;

/// Routes and their documentation, with `store` applied as state.
pub fn router(store: BookStore) -> OpenApiRouter {
    OpenApiRouter::with_openapi(BooksApi::openapi())
        .routes(routes!(list_books, create_book))
        .routes(routes!(get_book, update_book, delete_book))
        .with_state(store)
}

/// Lists all the books
#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    responses(
        (status = 200, description = "The list of books.", body = Vec<Book>)
    )
)]
async fn list_books(State(store): State<BookStore>) -> Json<Vec<Book>> {
    Json(store.list().await)
}

/// Gets a book by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "The book id")),
    responses(
        (status = 200, description = "The book.", body = Book),
        (status = 404, description = "Book not found.")
    )
)]
async fn get_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<Json<Book>, BookError> {
    let id: BookId = id.parse()?;
    Ok(Json(store.get(id).await?))
}

/// Creates a new book
#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "The created book.", body = Book),
        (status = 400, description = "Malformed JSON body.", body = shelf_http::error::ErrorResponse)
    )
)]
async fn create_book(
    State(store): State<BookStore>,
    LenientJson(draft): LenientJson<CreateBook>,
) -> (StatusCode, Json<Book>) {
    let book = store.create(draft).await;
    tracing::info!(id = %book.id, "book created");
    (StatusCode::CREATED, Json(book))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "The book id")),
    request_body = UpdateBook,
    responses(
        (status = 204, description = "Update was successful."),
        (status = 400, description = "Malformed JSON body.", body = shelf_http::error::ErrorResponse),
        (status = 404, description = "Book not found.")
    )
)]
async fn update_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
    LenientJson(changes): LenientJson<UpdateBook>,
) -> Result<StatusCode, BookError> {
    let id: BookId = id.parse()?;
    store.update(id, changes).await?;
    tracing::info!(id = %id, "book updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    params(("id" = u64, Path, description = "The book id")),
    responses(
        (status = 204, description = "Delete was successful."),
        (status = 404, description = "Book not found.")
    )
)]
async fn delete_book(
    State(store): State<BookStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, BookError> {
    let id: BookId = id.parse()?;
    store.delete(id).await?;
    tracing::info!(id = %id, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
