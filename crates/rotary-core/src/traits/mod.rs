// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the engine and its external collaborators.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod store;
pub mod validator;

pub use store::Store;
pub use validator::SpamValidator;
