//! Request and response bodies exchanged with the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use savat_core::UserId;

use crate::models::{OrderLine, User};

/// Envelope the auth endpoints wrap their payload in.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Payload of a successful login or registration.
#[derive(Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

/// Body of `POST /auth/login`.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/register`.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /carts`, placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    pub date: DateTime<Utc>,
    pub products: Vec<OrderLine>,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
