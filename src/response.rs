use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Every post listing is sliced into pages of this size.
pub const POSTS_PER_PAGE: u64 = 10;

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
            total_pages: total_pages(total, per_page),
        }
    }
}

pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

/// Resolve a requested page number the way a lenient paginator does:
/// missing or zero means the first page, anything past the end means the
/// last page. An empty listing still has a single (empty) page 1.
pub fn resolve_page(requested: Option<u64>, total: u64, per_page: u64) -> u64 {
    let last = total_pages(total, per_page).max(1);
    requested.unwrap_or(1).clamp(1, last)
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<String>,
}

impl PageQuery {
    /// The requested page, if it is a number at all. Anything else falls
    /// back to the first page instead of failing the request.
    pub fn number(&self) -> Option<u64> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}
