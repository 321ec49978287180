// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed per-entity query modules.
//!
//! Every function accepts `&Database` and goes through the single
//! tokio-rusqlite background thread. Status columns are parsed into their
//! enums at the row boundary; a corrupt value surfaces as a conversion
//! error rather than leaking a raw string into the engine.

pub mod cadences;
pub mod calls;
pub mod events;
pub mod numbers;
pub mod rotation_queue;

/// Parse a TEXT column into a strum-backed enum, mapping failures onto
/// rusqlite's conversion error so they flow through the normal error path.
pub(crate) fn parse_enum<T>(idx: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
