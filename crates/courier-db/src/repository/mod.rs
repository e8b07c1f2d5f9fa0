//! Repository layer: query functions organized by domain.

pub mod identities;
pub mod messages;
