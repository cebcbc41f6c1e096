use crate::{errors::ServiceError, ApiResponse, PaginatedResponse};
use axum::{http::StatusCode, response::Json};
use serde::Serialize;

/// Result of a handler that creates a resource.
pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

/// Standard created response
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Wraps one page of items with its totals.
pub fn paginated<T>(items: Vec<T>, total: u64, page: u64, limit: u64) -> PaginatedResponse<T> {
    let total_pages = if total == 0 || limit == 0 {
        0
    } else {
        (total + limit - 1) / limit
    };
    PaginatedResponse {
        items,
        total,
        page,
        limit,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_round_up() {
        assert_eq!(paginated(vec![1, 2], 41, 1, 20).total_pages, 3);
        assert_eq!(paginated(Vec::<u8>::new(), 0, 1, 20).total_pages, 0);
        assert_eq!(paginated(vec![1], 20, 1, 20).total_pages, 1);
    }
}
