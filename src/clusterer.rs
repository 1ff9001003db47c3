use crate::models::Transaction;

/// Amounts within this ratio of a band's smallest member share the band.
/// A heuristic, not a tuned constant; overridable via settings.
pub const DEFAULT_AMOUNT_RATIO: f64 = 3.0;

/// Split a vendor's transactions into bands of similar absolute amount.
///
/// Unique absolute amounts are sorted ascending and greedily banded: an
/// amount joins the current band while `amount / band_min <= ratio`, where
/// `band_min` is the band's first (smallest) member, not the previous
/// element. Bands come back in ascending order and together cover every
/// input row. An empty amount set passes the whole group through as a
/// single cluster so callers can treat "no clustering" uniformly.
///
/// This separates, say, a $12/month subscription from a one-time $400
/// charge at the same vendor without asking the operator to describe every
/// individual charge.
pub fn split_amount_clusters(group: &[Transaction], ratio: f64) -> Vec<Vec<Transaction>> {
    let mut amounts: Vec<f64> = group.iter().map(|t| t.amount.abs()).collect();
    amounts.sort_by(|a, b| a.total_cmp(b));
    amounts.dedup();

    if amounts.is_empty() {
        return vec![group.to_vec()];
    }

    let mut bands: Vec<Vec<f64>> = vec![vec![amounts[0]]];
    for &amt in &amounts[1..] {
        let band = bands.last_mut().unwrap();
        let anchor = band[0];
        if anchor > 0.0 && amt / anchor <= ratio {
            band.push(amt);
        } else {
            bands.push(vec![amt]);
        }
    }

    bands
        .iter()
        .map(|band| {
            group
                .iter()
                .filter(|t| band.contains(&t.amount.abs()))
                .cloned()
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txns(amounts: &[f64]) -> Vec<Transaction> {
        amounts
            .iter()
            .map(|&a| Transaction::new("VENDOR".to_string(), None, a))
            .collect()
    }

    fn band_amounts(cluster: &[Transaction]) -> Vec<f64> {
        cluster.iter().map(|t| t.amount).collect()
    }

    #[test]
    fn test_anchor_based_banding() {
        // 14/5 = 2.8 <= 3.0 stays; 500/5 = 100 > 3.0 starts a new band.
        let group = txns(&[5.0, 12.0, 14.0, 500.0]);
        let clusters = split_amount_clusters(&group, 3.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(band_amounts(&clusters[0]), vec![5.0, 12.0, 14.0]);
        assert_eq!(band_amounts(&clusters[1]), vec![500.0]);
    }

    #[test]
    fn test_anchor_not_pairwise() {
        // Pairwise chaining would keep 28 (28/12 = 2.33); the anchor test
        // evicts it (28/5 = 5.6).
        let group = txns(&[5.0, 12.0, 28.0]);
        let clusters = split_amount_clusters(&group, 3.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(band_amounts(&clusters[0]), vec![5.0, 12.0]);
        assert_eq!(band_amounts(&clusters[1]), vec![28.0]);
    }

    #[test]
    fn test_membership_by_absolute_value() {
        let group = txns(&[-12.99, -12.99, 12.99, -400.0]);
        let clusters = split_amount_clusters(&group, 3.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[1].len(), 1);
        assert_eq!(clusters[1][0].amount, -400.0);
    }

    #[test]
    fn test_clusters_cover_all_rows() {
        let group = txns(&[1.0, 2.0, 9.0, 10.0, 99.0, 100.0]);
        let clusters = split_amount_clusters(&group, 3.0);
        let total: usize = clusters.iter().map(|c| c.len()).sum();
        assert_eq!(total, group.len());
        // Ascending band order
        assert!(clusters[0][0].amount.abs() < clusters.last().unwrap()[0].amount.abs());
    }

    #[test]
    fn test_empty_group_passes_through() {
        let clusters = split_amount_clusters(&[], 3.0);
        assert_eq!(clusters.len(), 1);
        assert!(clusters[0].is_empty());
    }

    #[test]
    fn test_single_amount_single_band() {
        let group = txns(&[42.0, 42.0, 42.0]);
        let clusters = split_amount_clusters(&group, 3.0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn test_ratio_is_configurable() {
        let group = txns(&[10.0, 25.0]);
        assert_eq!(split_amount_clusters(&group, 3.0).len(), 1);
        assert_eq!(split_amount_clusters(&group, 2.0).len(), 2);
    }
}
