//! Client library for browsing the Physiome Model Repository.
//!
//! Workspaces and exposures are fetched through [`api::PmrClient`] and held in
//! the TTL-backed stores under [`stores`]. Rendering helpers turn Markdown and
//! fetched HTML fragments into self-contained HTML.

pub mod api;
pub mod cache;
pub mod citation;
pub mod config;
pub mod files;
pub mod format;
pub mod license;
pub mod links;
pub mod logging;
pub mod notification;
pub mod render;
pub mod search;
pub mod sort;
pub mod storage;
pub mod stores;
