//! Route handlers, one module per resource.

use axum::extract::FromRequest;

use crate::error::Error;

pub mod account;
pub mod jobs;
pub mod opens;
pub mod tags;

/// A JSON request body whose rejections answer with the API's
/// `{"error": …}` shape instead of axum's plain-text body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);
