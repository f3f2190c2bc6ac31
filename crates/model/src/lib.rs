//! The contract between the chat widget and a text-generation service.
//!
//! The widget sends one prompt per user submission and expects one
//! generated reply back. This crate only describes that exchange: a
//! request, a reply, and the error a provider may fail with. Concrete
//! providers (a remote HTTP service, a scripted fake for tests) live in
//! their own crates and implement [`ModelProvider`].
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod provider;
mod reply;
mod request;

pub use error::*;
pub use provider::*;
pub use reply::*;
pub use request::*;
