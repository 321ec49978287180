// SPDX-FileCopyrightText: 2026 Rotary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SPAM-validation provider trait.
//!
//! Providers are external collaborators; only the normalized verdict shape
//! crosses into the engine. Combining multiple verdicts lives in the engine
//! (`rotary-engine::validate`), not here.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SpamVerdict;

/// A SPAM-detection provider returning a normalized verdict for a number.
#[async_trait]
pub trait SpamValidator: Send + Sync + 'static {
    /// Short provider name used in logs and degraded-provider warnings.
    fn name(&self) -> &str;

    /// Validate a number string, returning the provider's verdict.
    ///
    /// Errors are degraded locally by the caller: a failed provider is
    /// omitted from the combined score rather than failing the request.
    async fn validate(&self, number: &str) -> Result<SpamVerdict>;
}
