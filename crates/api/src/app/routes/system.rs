use axum::http::StatusCode;

pub async fn root() -> &'static str {
    "Silver Sport is running"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
