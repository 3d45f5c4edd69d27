use std::cmp::Ordering;

use super::types::{DebtId, Strategy};

/// Ranks debts for the extra budget. `standings` is `(id, balance, rate)` in
/// input order; ties in both keys keep that order.
pub fn focus_order(standings: &[(DebtId, f64, f64)], strategy: Strategy) -> Vec<DebtId> {
    let mut ranked = standings.to_vec();
    ranked.sort_by(|a, b| compare(a, b, strategy));
    ranked.into_iter().map(|(id, _, _)| id).collect()
}

fn compare(a: &(DebtId, f64, f64), b: &(DebtId, f64, f64), strategy: Strategy) -> Ordering {
    let (_, a_balance, a_rate) = *a;
    let (_, b_balance, b_rate) = *b;
    match strategy {
        Strategy::Snowball => a_balance
            .total_cmp(&b_balance)
            .then_with(|| b_rate.total_cmp(&a_rate)),
        Strategy::Avalanche => b_rate
            .total_cmp(&a_rate)
            .then_with(|| a_balance.total_cmp(&b_balance)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[usize]) -> Vec<DebtId> {
        raw.iter().copied().map(DebtId).collect()
    }

    #[test]
    fn snowball_prefers_smallest_balance_then_higher_rate() {
        let standings = [
            (DebtId(0), 5_000.0, 0.20),
            (DebtId(1), 500.0, 0.05),
            (DebtId(2), 500.0, 0.18),
            (DebtId(3), 2_000.0, 0.30),
        ];
        assert_eq!(
            focus_order(&standings, Strategy::Snowball),
            ids(&[2, 1, 3, 0])
        );
    }

    #[test]
    fn avalanche_prefers_highest_rate_then_smaller_balance() {
        let standings = [
            (DebtId(0), 5_000.0, 0.20),
            (DebtId(1), 500.0, 0.05),
            (DebtId(2), 800.0, 0.20),
            (DebtId(3), 2_000.0, 0.30),
        ];
        assert_eq!(
            focus_order(&standings, Strategy::Avalanche),
            ids(&[3, 2, 0, 1])
        );
    }

    #[test]
    fn full_ties_keep_input_order() {
        let standings = [
            (DebtId(4), 100.0, 0.1),
            (DebtId(1), 100.0, 0.1),
            (DebtId(7), 100.0, 0.1),
        ];
        assert_eq!(focus_order(&standings, Strategy::Snowball), ids(&[4, 1, 7]));
        assert_eq!(focus_order(&standings, Strategy::Avalanche), ids(&[4, 1, 7]));
    }

    #[test]
    fn paid_debts_still_rank_but_are_skipped_by_caller() {
        let standings = [(DebtId(0), 0.0, 0.0), (DebtId(1), 10.0, 0.0)];
        assert_eq!(focus_order(&standings, Strategy::Snowball), ids(&[0, 1]));
    }
}
