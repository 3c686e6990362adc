//! Temporal decay scoring: exponential recency with exemptions, and
//! the blend with similarity that produces a candidate's final score.

/// Axes that force recency to `1.0` regardless of age.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecayExemptions {
    /// `lineage.utility == load_bearing`.
    pub load_bearing: bool,
    /// `lineage.source == user_asserted`.
    pub user_asserted: bool,
    /// `lineage.validity == confirmed`.
    pub confirmed: bool,
}

impl DecayExemptions {
    fn exempt(&self) -> bool {
        self.load_bearing || self.user_asserted || self.confirmed
    }
}

/// `exp(-decay_rate * age_hours)`, floored at `min_recency_score`,
/// forced to `1.0` under any [`DecayExemptions`].
pub fn recency_score(
    age_hours: f64,
    half_life_hours: f64,
    min_recency_score: f64,
    exemptions: DecayExemptions,
) -> f64 {
    if exemptions.exempt() {
        return 1.0;
    }
    let decay_rate = std::f64::consts::LN_2 / half_life_hours;
    let recency = (-decay_rate * age_hours).exp();
    recency.max(min_recency_score)
}

/// `(1 - decay_weight) * similarity + decay_weight * recency`.
pub fn decay_weighted_score(similarity: f64, recency: f64, decay_weight: f64) -> f64 {
    (1.0 - decay_weight) * similarity + decay_weight * recency
}
