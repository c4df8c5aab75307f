//! Data Transfer Objects for REST request/response serialization.

pub mod save_dto;

pub use save_dto::*;
