//! Core logic of the chat widget: the transcript and its persisted history,
//! voice input, the reply lifecycle and the event loop tying them together.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod controller;
pub mod message;
mod reply_client;
pub mod shell;
pub mod storage;
pub mod transcript;
pub mod voice;
mod widget;

pub use reply_client::{ReplyClient, ReplyError};
pub use widget::{
    ChatView, Widget, WidgetBuilder, WidgetClosedError, WidgetView,
};
