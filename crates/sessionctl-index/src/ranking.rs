//! Recency-adjusted scoring (spec §4.7): a raw relevance score is boosted
//! by an exponential decay on document age, so a middling match on a
//! session from this morning can outrank a perfect match from last year.

pub const DEFAULT_HALF_LIFE_DAYS: f64 = 7.0;

pub fn recency_adjusted_score(raw: f64, age_seconds: f64, half_life_days: f64) -> f64 {
    let half_life_seconds = half_life_days * 86_400.0;
    raw * (1.0 + (-age_seconds / half_life_seconds).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_age_doubles_the_raw_score() {
        let score = recency_adjusted_score(1.0, 0.0, DEFAULT_HALF_LIFE_DAYS);
        assert!((score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn older_documents_score_lower_for_the_same_raw_score() {
        let fresh = recency_adjusted_score(1.0, 0.0, DEFAULT_HALF_LIFE_DAYS);
        let stale = recency_adjusted_score(1.0, 30.0 * 86_400.0, DEFAULT_HALF_LIFE_DAYS);
        assert!(stale < fresh);
        assert!(stale > 1.0);
    }
}
