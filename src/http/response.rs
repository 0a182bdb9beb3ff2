//! Response built up while the route table runs.
//!
//! # Responsibilities
//! - Record the status set by the router on a match
//! - Collect the body produced by the dispatched view or controller
//! - Convert into an axum response for the host server
//!
//! # Design Decisions
//! - Starts as `404 Not Found` so an unmatched table falls through
//! - Body output is appended, matching how templates write output

use std::cell::RefCell;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response as AxumResponse},
};

/// The response collaborator used by the router.
pub trait Response {
    fn set_status(&self, status: StatusCode);

    /// Append rendered output to the body.
    fn send(&self, body: &str);
}

/// Response accumulated for one request.
#[derive(Debug)]
pub struct HttpResponse {
    status: RefCell<StatusCode>,
    body: RefCell<String>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self {
            status: RefCell::new(StatusCode::NOT_FOUND),
            body: RefCell::new(String::new()),
        }
    }

    pub fn status(&self) -> StatusCode {
        *self.status.borrow()
    }

    pub fn body(&self) -> String {
        self.body.borrow().clone()
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl Response for HttpResponse {
    fn set_status(&self, status: StatusCode) {
        *self.status.borrow_mut() = status;
    }

    fn send(&self, body: &str) {
        self.body.borrow_mut().push_str(body);
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> AxumResponse {
        let status = self.status.into_inner();
        let body = self.body.into_inner();
        (
            status,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            Body::from(body),
        )
            .into_response()
    }
}
