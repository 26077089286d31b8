//! HTTP client module
//!
//! Provides the HTTP client every provider call goes through.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx, timeouts and connect errors
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Typed Failures**: non-success statuses become `Error::HttpStatus`

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, JsonResponse, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
