//! versioned, tier-gated catalog entries.

use serde::{Deserialize, Serialize};

use crate::tier::Tier;
use crate::version::ModelVersion;

/// a downloadable model in the catalog.
///
/// catalog rows are read-only to the http surface; the operator cli
/// creates and updates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// unique identifier, also the blob store key suffix
    pub id: String,

    /// human-readable name
    pub name: String,

    /// current catalog version
    pub version: ModelVersion,

    /// minimum tier required to see and download this model
    pub tier: Tier,

    /// short description shown in listings
    pub description: String,

    /// payload size in bytes
    pub size: i64,
}

impl Model {
    /// check whether a caller at `tier` may see this model.
    pub fn visible_to(&self, tier: Tier) -> bool {
        self.tier.level() <= tier.level()
    }
}

/// sort models by (tier level, name), the catalog listing order.
pub fn sort_catalog(models: &mut [Model]) {
    models.sort_by(|a, b| {
        a.tier
            .level()
            .cmp(&b.tier.level())
            .then_with(|| a.name.cmp(&b.name))
    });
}
