//! PMR backend API: wire types, domain types, the HTTP client and the service
//! traits it implements.

pub mod api_types;
pub mod client;
pub mod services;
pub mod types;

pub use client::PmrClient;
pub use services::{AuthService, ExposureService, SearchService, WorkspaceService};
