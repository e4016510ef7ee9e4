// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules. Every function takes `&Database` and runs on the single
//! writer thread.

pub mod agents;
pub mod knowledge;
pub mod messages;
pub mod notifications;
pub mod sessions;
pub mod tickets;
pub mod website;
