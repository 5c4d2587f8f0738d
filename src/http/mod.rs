// src/http/mod.rs
pub mod client;

pub use client::{Fetcher, HttpResponse, RetryPolicy};
