//! Model catalog and recommendation types.
//!
//! The catalog is static reference data. Profiles score each model from 1 to
//! 5 across five [`Dimension`]s; callers weigh those dimensions with a
//! [`WeightVector`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scored dimension of a model profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Output quality.
    Quality,
    /// Response latency (higher is faster).
    Latency,
    /// Cost (higher is cheaper).
    Cost,
    /// Context window size.
    Context,
    /// Multimodal support.
    Multimodal,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Quality,
        Self::Latency,
        Self::Cost,
        Self::Context,
        Self::Multimodal,
    ];

    /// Returns the dimension name as used in JSON bodies.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Latency => "latency",
            Self::Cost => "cost",
            Self::Context => "context",
            Self::Multimodal => "multimodal",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static scores for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelProfile {
    /// Model identifier.
    pub id: &'static str,
    /// Quality score.
    pub quality: u8,
    /// Latency score.
    pub latency: u8,
    /// Cost score.
    pub cost: u8,
    /// Context score.
    pub context: u8,
    /// Multimodal score.
    pub multimodal: u8,
}

impl ModelProfile {
    /// Returns the profile's score on one dimension.
    #[must_use]
    pub const fn score(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Quality => self.quality,
            Dimension::Latency => self.latency,
            Dimension::Cost => self.cost,
            Dimension::Context => self.context,
            Dimension::Multimodal => self.multimodal,
        }
    }
}

/// Built-in model profiles, in declaration order.
pub const BUILTIN_PROFILES: &[ModelProfile] = &[
    ModelProfile {
        id: "gpt-4o",
        quality: 5,
        latency: 3,
        cost: 2,
        context: 5,
        multimodal: 5,
    },
    ModelProfile {
        id: "gpt-4o-mini",
        quality: 4,
        latency: 5,
        cost: 5,
        context: 4,
        multimodal: 4,
    },
    ModelProfile {
        id: "o3-mini",
        quality: 4,
        latency: 4,
        cost: 4,
        context: 3,
        multimodal: 3,
    },
];

/// Ordered, immutable set of model profiles.
///
/// Declaration order is significant: it breaks ranking ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelCatalog {
    profiles: &'static [ModelProfile],
}

impl ModelCatalog {
    /// Returns the built-in catalog.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            profiles: BUILTIN_PROFILES,
        }
    }

    /// Creates a catalog over a static profile table.
    #[must_use]
    pub const fn from_static(profiles: &'static [ModelProfile]) -> Self {
        Self { profiles }
    }

    /// Returns the profiles in declaration order.
    #[must_use]
    pub const fn profiles(&self) -> &'static [ModelProfile] {
        self.profiles
    }

    /// Looks up a profile by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'static ModelProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    /// Returns true if the identifier names a catalog model.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Returns the catalog identifiers in declaration order.
    #[must_use]
    pub fn ids(&self) -> Vec<&'static str> {
        self.profiles.iter().map(|profile| profile.id).collect()
    }

    /// Returns the number of profiles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the catalog has no profiles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Scores every profile and sorts best first.
    ///
    /// Equal scores keep catalog declaration order.
    #[must_use]
    pub fn rank(&self, weights: &WeightVector) -> Vec<RankedModel> {
        let mut scored: Vec<(usize, f64, &'static str)> = self
            .profiles
            .iter()
            .enumerate()
            .map(|(index, profile)| (index, weights.score(profile), profile.id))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        scored
            .into_iter()
            .map(|(_, score, id)| RankedModel {
                model: id.to_string(),
                score,
            })
            .collect()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Caller-supplied importance weights.
///
/// Weights are unconstrained in sign and magnitude. A dimension missing from
/// a JSON body counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightVector {
    /// Weight for quality.
    pub quality: f64,
    /// Weight for latency.
    pub latency: f64,
    /// Weight for cost.
    pub cost: f64,
    /// Weight for context.
    pub context: f64,
    /// Weight for multimodal support.
    pub multimodal: f64,
}

impl WeightVector {
    /// Creates a weight vector in canonical dimension order.
    #[must_use]
    pub const fn new(quality: f64, latency: f64, cost: f64, context: f64, multimodal: f64) -> Self {
        Self {
            quality,
            latency,
            cost,
            context,
            multimodal,
        }
    }

    /// Returns the weight for one dimension.
    #[must_use]
    pub const fn weight(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Quality => self.quality,
            Dimension::Latency => self.latency,
            Dimension::Cost => self.cost,
            Dimension::Context => self.context,
            Dimension::Multimodal => self.multimodal,
        }
    }

    /// Weighted sum of a profile's scores.
    #[must_use]
    pub fn score(&self, profile: &ModelProfile) -> f64 {
        Dimension::ALL
            .iter()
            .map(|&dimension| self.weight(dimension) * f64::from(profile.score(dimension)))
            .sum()
    }
}

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModel {
    /// Model identifier.
    pub model: String,
    /// Weighted score.
    pub score: f64,
}

/// Result of ranking the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// The top-ranked model.
    pub recommendation: RankedModel,
    /// The whole catalog, best first.
    pub ranked: Vec<RankedModel>,
}
