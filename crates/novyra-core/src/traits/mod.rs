// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the engine and its backends.
//!
//! Async traits use `#[async_trait]` so they can be held as
//! `Arc<dyn Trait + Send + Sync>`.

pub mod adapter;
pub mod broadcast;
pub mod clock;
pub mod mail;
pub mod notify;
pub mod responder;
pub mod store;

pub use adapter::PluginAdapter;
pub use broadcast::Broadcaster;
pub use clock::{Clock, SystemClock};
pub use mail::EmailSender;
pub use notify::NotificationSink;
pub use responder::ExternalResponder;
pub use store::ChatStore;
