//! # Kopite
//!
//! A read-only viewer core for community news feeds.
//!
//! ## Architecture
//!
//! Every read flows through the same pipeline:
//!
//! ```text
//! Coordinator → Cache → RateLimiter → Mediator → Normalizer → Store → Selectors
//! ```
//!
//! - [`mediator`]: Request shapes, the same-origin proxy and the public
//!   mediator chain
//! - [`normalizer`]: Converts upstream JSON into [`Post`](domain::Post) and
//!   [`Comment`](domain::Comment) records
//! - [`store`]: Event-driven state container with pure reducers
//! - [`coordinator`]: User intents as request/success/failure sequences
//!
//! ## Quick Start
//!
//! ```bash
//! # Hot posts from the default community
//! kopite listing
//!
//! # Top posts of the week, videos only
//! kopite listing --sort top --time week --media videos
//!
//! # Search
//! kopite search "salah"
//!
//! # One post with its comments
//! kopite post 1abcde
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// cache, limiter, mediator, store, coordinator.
pub mod app;

/// Time-based expiry for upstream payloads.
pub mod cache;

/// Command-line interface using clap.
///
/// - `listing` - Show a community listing
/// - `search <query>` - Search a community
/// - `post <id>` - Show a post with its comments
/// - `comments <id>` - Show a comment tree
/// - `config` - Print the effective configuration
pub mod cli;

/// Wall-clock abstraction shared by the cache and the rate limiter.
pub mod clock;

/// Configuration management.
///
/// Loads from `~/.config/kopite/config.toml`, supporting:
/// - Community allow-list and default
/// - Mediator mode and chain
/// - Rate limit, cache and timeout settings
pub mod config;

pub mod coordinator;

/// Core domain models.
///
/// - [`Post`](domain::Post): A normalized submission
/// - [`Comment`](domain::Comment): A comment tree node
/// - [`Selection`](domain::Selection): What the user is looking at
/// - [`ContainerState`](domain::ContainerState): The whole view state
pub mod domain;

/// HTTP transport and admission control.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for raw GETs
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`RateLimiter`](fetcher::RateLimiter): Sliding-window admission
pub mod fetcher;

pub mod mediator;

/// Upstream JSON to domain records.
pub mod normalizer;

pub mod store;

#[cfg(test)]
mod test_support;
