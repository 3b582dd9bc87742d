//! # LexLeaks Shared
//!
//! Wire types shared between the API server and its clients. This crate has
//! no dependency on the domain so that it can be compiled for any target.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
