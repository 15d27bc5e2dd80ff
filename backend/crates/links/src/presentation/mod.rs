//! Presentation Layer
//!
//! HTTP handlers, DTOs, and routers.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::LinksAppState;
pub use router::{links_router, links_router_generic, redirect_router, redirect_router_generic};
