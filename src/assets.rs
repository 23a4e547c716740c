use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "web/dist"]
pub struct Assets;

/// Page routes of the single-page UI. Each one boots the same `index.html`.
pub const PAGES: &[&str] = &["/", "/dashboard", "/books", "/authors", "/categories"];

pub async fn serve_index() -> Response {
    serve_file("index.html")
}

pub async fn serve_embedded(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    // For SPA routing: serve index.html for paths without file extensions
    let path = if path.is_empty() || !path.contains('.') {
        "index.html"
    } else {
        path
    };

    serve_file(path)
}

fn serve_file(path: &str) -> Response {
    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref().to_string())], content.data.into_owned()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
