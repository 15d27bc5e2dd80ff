//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (ShortLink)
//! - Domain value objects (ShortKey, TargetUrl)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod value_objects;
