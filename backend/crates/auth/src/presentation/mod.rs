//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{AuthAppState, AuthStore};
pub use middleware::{AuthMiddlewareState, require_auth_session};
pub use router::{auth_router, auth_router_generic};
