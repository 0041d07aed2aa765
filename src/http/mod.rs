//! HTTP client module
//!
//! Provides the typed TheSeed client and the rate limiter gating its calls.
//!
//! # Features
//!
//! - **Typed Operations**: edit fetch/submit, backlinks, discussions
//! - **Rate Limiting**: minimum interval between request starts
//! - **Fail Fast**: non-2xx statuses and schema mismatches surface as typed errors

mod client;
mod rate_limit;

pub use client::{user_agent, BacklinkQuery, TheSeedClient, TRANSPORT_USER_AGENT};
pub use rate_limit::{Clock, IntervalLimiter, RateLimiter, SystemClock};
