//! Savat Storefront library.
//!
//! The in-process core of the storefront: a cart store and an auth session
//! holder, both synchronized to a local key/value store, plus the REST client
//! that talks to the backend owning products, orders and authentication.
//!
//! # Architecture
//!
//! - [`storage`] - `LocalStorage` trait with memory and file backends
//! - [`cart`] - Pure reducer, persisted `CartStore`, derived summary, quantity limit
//! - [`session`] - `SessionHolder` for the signed-in identity and bearer token
//! - [`api`] - `reqwest` client for the backend, product lookups cached with `moka`
//! - [`models`] - Product, user and order records
//! - [`state`] - `Storefront` context wiring everything together
//! - [`config`] / [`error`] - `SAVAT_*` environment settings and `AppError`
//!
//! Nothing here is a global: callers construct a [`Storefront`] (or the
//! individual stores) and pass it where it is needed.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;

pub use error::{AppError, Result};
pub use state::Storefront;
