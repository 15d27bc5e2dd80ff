//! Application Layer
//!
//! Use cases for creating, resolving, and managing short links.

pub mod config;
pub mod create_link;
pub mod manage_links;
pub mod resolve_link;

pub use config::LinksConfig;
pub use create_link::{CreateLinkInput, CreateLinkUseCase};
pub use manage_links::{ManageLinksUseCase, UpdateLinkInput};
pub use resolve_link::ResolveLinkUseCase;
