//! Request extractors whose rejections use the Courier error shape.

use axum::{
    extract::FromRequest,
    response::{IntoResponse, Response},
};
use courier_common::error::CourierError;
use serde::Serialize;

/// Drop-in for [`axum::Json`] that rejects with [`CourierError::Validation`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(CourierError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
