use crate::models::{Group, Record};
use crate::scoring::coefficient::compute_coefficient;
use crate::scoring::{StandingRow, Standings};

/// Coefficient for a record, or `None` if either rank is unset.
pub fn score_record(record: &Record) -> Option<f64> {
    match (record.old_rank, record.new_rank) {
        (Some(old_rank), Some(new_rank)) => Some(compute_coefficient(old_rank, new_rank)),
        _ => None,
    }
}

/// Copy of the group with every derived field rebuilt from raw ranks.
pub fn recompute_group(group: &Group) -> Group {
    let mut total = 0.0;
    let mut count = 0usize;

    let records: Vec<Record> = group
        .records
        .iter()
        .map(|record| {
            let coefficient = score_record(record);
            if let Some(z) = coefficient {
                total += z;
                count += 1;
            }
            Record {
                coefficient,
                ..record.clone()
            }
        })
        .collect();

    Group {
        records,
        total_coefficient: total,
        average_coefficient: if count > 0 { total / count as f64 } else { 0.0 },
        ..group.clone()
    }
}

/// Full projection of a collection. Stored aggregates are never trusted, every
/// read path goes through here.
pub fn recompute(groups: &[Group]) -> Vec<Group> {
    groups.iter().map(recompute_group).collect()
}

/// Number of records carrying a coefficient.
pub fn valid_count(group: &Group) -> usize {
    group.records.iter().filter(|record| record.is_rated()).count()
}

/// Leading group among those with at least one rated record.
///
/// Expects a recomputed collection. Left-to-right fold that only replaces the
/// current leader on a strictly greater average, so ties go to the earlier group.
pub fn select_winner(groups: &[Group]) -> Option<&Group> {
    groups
        .iter()
        .filter(|group| valid_count(group) > 0)
        .fold(None, |leader: Option<&Group>, group| match leader {
            Some(current) if group.average_coefficient <= current.average_coefficient => Some(current),
            Some(current) if group.average_coefficient.is_nan() => Some(current),
            _ => Some(group),
        })
}

/// Recomputes the collection and summarises it per group.
pub fn standings(groups: &[Group]) -> Standings {
    let projected = recompute(groups);
    let winner = select_winner(&projected);
    let winner_id = winner.map(|group| group.id.clone());

    let rows = projected
        .iter()
        .map(|group| StandingRow {
            group_id: group.id.clone(),
            name: group.name.clone(),
            valid_count: valid_count(group),
            total: group.total_coefficient,
            average: group.average_coefficient,
            is_winner: winner_id.as_deref() == Some(group.id.as_str()),
        })
        .collect();

    Standings {
        winner_name: winner.map(|group| group.name.clone()),
        winner_average: winner.map(|group| group.average_coefficient),
        winner_id,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, ranks: &[(f64, f64)]) -> Group {
        let records = ranks
            .iter()
            .map(|(old_rank, new_rank)| Record::ranked("x", *old_rank, *new_rank))
            .collect();
        Group::new(name, records)
    }

    #[test]
    fn totals_and_averages_skip_unrated_records() {
        let mut g = group("A", &[(100.0, 80.0), (50.0, 55.0)]);
        g.records.push(Record::blank());
        g.records.push(Record {
            old_rank: Some(10.0),
            ..Record::blank()
        });

        let projected = recompute_group(&g);
        let expected_total = 40.0 / 180.0 - 10.0 / 105.0;
        assert!((projected.total_coefficient - expected_total).abs() < 1e-12);
        assert!((projected.average_coefficient - expected_total / 2.0).abs() < 1e-12);
        assert_eq!(projected.records[2].coefficient, None);
        assert_eq!(projected.records[3].coefficient, None);
        assert_eq!(valid_count(&projected), 2);
    }

    #[test]
    fn stale_stored_values_are_overwritten() {
        let mut g = group("A", &[(10.0, 10.0)]);
        g.records[0].coefficient = Some(1.5);
        g.total_coefficient = 99.0;
        g.average_coefficient = 42.0;

        let projected = recompute_group(&g);
        assert_eq!(projected.records[0].coefficient, Some(0.0));
        assert_eq!(projected.total_coefficient, 0.0);
        assert_eq!(projected.average_coefficient, 0.0);
    }

    #[test]
    fn empty_group_averages_zero() {
        let projected = recompute_group(&Group::new("empty", vec![Record::blank()]));
        assert_eq!(projected.total_coefficient, 0.0);
        assert_eq!(projected.average_coefficient, 0.0);
    }

    #[test]
    fn ties_go_to_the_first_group() {
        // averages 0.1, 0.3, 0.3
        let groups = recompute(&[
            group("low", &[(21.0, 19.0)]),
            group("first-high", &[(23.0, 17.0)]),
            group("second-high", &[(23.0, 17.0)]),
        ]);
        assert!((groups[0].average_coefficient - 0.1).abs() < 1e-12);
        assert!((groups[1].average_coefficient - 0.3).abs() < 1e-12);

        let winner = select_winner(&groups).unwrap();
        assert_eq!(winner.name, "first-high");
    }

    #[test]
    fn groups_without_rated_records_never_win() {
        let groups = recompute(&[
            Group::new("blank", vec![Record::blank()]),
            group("behind", &[(10.0, 20.0)]),
        ]);
        assert_eq!(select_winner(&groups).unwrap().name, "behind");
    }

    #[test]
    fn no_winner_without_data() {
        let groups = recompute(&[
            Group::new("a", vec![Record::blank()]),
            Group::new("b", Vec::new()),
        ]);
        assert!(select_winner(&groups).is_none());

        let summary = standings(&groups);
        assert_eq!(summary.winner_id, None);
        assert!(summary.rows.iter().all(|row| !row.is_winner));
    }

    #[test]
    fn standings_flag_the_winner() {
        let groups = vec![group("a", &[(50.0, 55.0)]), group("b", &[(100.0, 80.0)])];
        let summary = standings(&groups);
        assert_eq!(summary.winner_name.as_deref(), Some("b"));
        assert_eq!(summary.winner_id.as_deref(), Some(groups[1].id.as_str()));
        assert!(!summary.rows[0].is_winner);
        assert!(summary.rows[1].is_winner);
        assert_eq!(summary.rows[1].valid_count, 1);
    }
}
