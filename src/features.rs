use crate::model::{EnrichedTeamMatch, JoinedTeamMatch, PossessionBucket};

pub const YELLOW_CARD_WEIGHT: u64 = 2;
pub const RED_CARD_WEIGHT: u64 = 5;

pub fn shot_accuracy(shots_on_target: u32, total_shots: u32) -> Option<f64> {
    if total_shots == 0 {
        return None;
    }
    Some(f64::from(shots_on_target) / f64::from(total_shots))
}

/// Higher is worse: fouls + 2 per yellow + 5 per red. Widened to `u64` so any `u32` counts fit.
pub fn discipline_score(fouls: u32, yellow_cards: u32, red_cards: u32) -> u64 {
    u64::from(fouls)
        + u64::from(yellow_cards) * YELLOW_CARD_WEIGHT
        + u64::from(red_cards) * RED_CARD_WEIGHT
}

/// Bands are `[0,40)`, `[40,50)`, `[50,60)` and `[60,100]`. Anything else is uncategorised.
pub fn possession_bucket(possession_pct: f64) -> Option<PossessionBucket> {
    if !possession_pct.is_finite() || !(0.0..=100.0).contains(&possession_pct) {
        return None;
    }
    let bucket = if possession_pct < 40.0 {
        PossessionBucket::Low
    } else if possession_pct < 50.0 {
        PossessionBucket::Medium
    } else if possession_pct < 60.0 {
        PossessionBucket::High
    } else {
        PossessionBucket::VeryHigh
    };
    Some(bucket)
}

pub fn enrich(joined: JoinedTeamMatch) -> EnrichedTeamMatch {
    let stat = &joined.stat;
    let shot_accuracy = shot_accuracy(stat.shots_on_target, stat.total_shots);
    let discipline_score =
        discipline_score(stat.fouls_committed, stat.yellow_cards, stat.red_cards);
    let possession_bucket = possession_bucket(stat.possession_pct);
    EnrichedTeamMatch {
        joined,
        shot_accuracy,
        discipline_score,
        possession_bucket,
    }
}

pub fn derive_features(rows: Vec<JoinedTeamMatch>) -> Vec<EnrichedTeamMatch> {
    rows.into_iter().map(enrich).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        assert_eq!(possession_bucket(0.0), Some(PossessionBucket::Low));
        assert_eq!(possession_bucket(39.99), Some(PossessionBucket::Low));
        assert_eq!(possession_bucket(40.0), Some(PossessionBucket::Medium));
        assert_eq!(possession_bucket(45.0), Some(PossessionBucket::Medium));
        assert_eq!(possession_bucket(50.0), Some(PossessionBucket::High));
        assert_eq!(possession_bucket(60.0), Some(PossessionBucket::VeryHigh));
        assert_eq!(possession_bucket(100.0), Some(PossessionBucket::VeryHigh));
    }

    #[test]
    fn out_of_range_possession_is_uncategorised() {
        assert_eq!(possession_bucket(-0.1), None);
        assert_eq!(possession_bucket(100.5), None);
        assert_eq!(possession_bucket(f64::NAN), None);
    }

    #[test]
    fn zero_shots_has_no_accuracy() {
        assert_eq!(shot_accuracy(0, 0), None);
        assert_eq!(shot_accuracy(3, 5), Some(0.6));
        assert_eq!(shot_accuracy(0, 4), Some(0.0));
    }

    #[test]
    fn discipline_weights_cards() {
        assert_eq!(discipline_score(2, 1, 0), 4);
        assert_eq!(discipline_score(10, 2, 1), 19);
        assert_eq!(discipline_score(0, 0, 0), 0);
    }

    #[test]
    fn discipline_does_not_cap_large_counts() {
        assert_eq!(discipline_score(u32::MAX, 1, 0), 4_294_967_297);
        assert_eq!(
            discipline_score(u32::MAX, u32::MAX, u32::MAX),
            8 * u64::from(u32::MAX)
        );
    }
}
