//! Links Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Behavior
//! - Keys are case-sensitive alphanumerics, generated at 6 characters
//!   by default, never longer than 20
//! - Redirects answer 302 for live links, 404 for unknown keys, and
//!   410 once a link's expiry has passed
//! - Every served redirect counts one click; counting is atomic under
//!   concurrent requests

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::LinksConfig;
pub use error::{LinkError, LinkResult};
pub use infra::postgres::PgLinkRepository;
pub use presentation::router::{links_router, redirect_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::InMemoryLinkRepository;
    pub use crate::infra::postgres::PgLinkRepository;
}

pub mod router {
    pub use crate::presentation::router::*;
}
