//! An out-of-the-box chat widget backed by Gemini, with the history kept in
//! the user's data directory.
//!
//! The crate includes a terminal front end. And you can also use it as a
//! library to embed the widget into your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod session;
pub mod speech;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`chat_widget_core`] crate.
pub mod core {
    pub use chat_widget_core::*;
}
