use rank_bote::locale::Labels;
use rank_bote::models::Group;
use rank_bote::scoring::{Standings, Trend};
use std::fmt::Write;

// Discord rejects message content longer than this
pub const MESSAGE_LIMIT: usize = 2000;

pub fn format_coefficient(coefficient: Option<f64>, placeholder: &str) -> String {
    match coefficient {
        Some(z) => format!("{:.4}", z),
        None => placeholder.to_string(),
    }
}

pub fn format_rank(rank: Option<f64>, placeholder: &str) -> String {
    match rank {
        Some(value) if value.fract() == 0.0 => format!("{}", value as i64),
        Some(value) => value.to_string(),
        None => placeholder.to_string(),
    }
}

/// Reads a rank typed into a command option. `-`, `none`, `unset` or blank
/// clear the rank.
pub fn parse_rank_input(text: &str) -> Result<Option<f64>, String> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" | "-" | "none" | "unset" => Ok(None),
        _ => trimmed
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| format!("'{}' is not a rank. Use a number, or `-` to clear it.", trimmed)),
    }
}

/// Leaderboard headline.
pub fn render_winner(standings: &Standings) -> String {
    match (&standings.winner_name, standings.winner_average) {
        (Some(name), Some(average)) => format!(
            "🏆 **{}** leads with an average coefficient of **{:.4}**",
            if name.is_empty() { "(unnamed)" } else { name.as_str() },
            average
        ),
        _ => "Waiting for ranks... no group has a complete record yet.".to_string(),
    }
}

/// Full listing with 1-based positions, as referenced by the other subcommands.
pub fn render_roster(groups: &[Group], standings: &Standings, labels: &Labels) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", render_winner(standings));

    for (index, (group, row)) in groups.iter().zip(&standings.rows).enumerate() {
        let crown = if row.is_winner { " 🏆" } else { "" };
        let _ = writeln!(
            out,
            "**#{} {}**{} (rated {}/{}, total {:.4}, avg {:.4})",
            index + 1,
            group.name,
            crown,
            row.valid_count,
            group.records.len(),
            row.total,
            row.average
        );
        for (position, record) in group.records.iter().enumerate() {
            let _ = writeln!(
                out,
                "`{:>2}` {} {}: {} → {} = {}",
                position + 1,
                Trend::of(record.coefficient).symbol(),
                if record.name.is_empty() { "(no name)" } else { record.name.as_str() },
                format_rank(record.old_rank, labels.placeholder),
                format_rank(record.new_rank, labels.placeholder),
                format_coefficient(record.coefficient, labels.placeholder)
            );
        }
        out.push('\n');
    }

    clip(out.trim_end(), MESSAGE_LIMIT)
}

/// Cuts text to at most `max_chars` characters, marking the cut.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rank_bote::locale::{Locale, ENGLISH};
    use rank_bote::models::seed_groups;
    use rank_bote::scoring::{recompute, standings};

    #[test]
    fn rank_input_parsing() {
        assert_eq!(parse_rank_input("12"), Ok(Some(12.0)));
        assert_eq!(parse_rank_input(" 3.5 "), Ok(Some(3.5)));
        assert_eq!(parse_rank_input("-"), Ok(None));
        assert_eq!(parse_rank_input("None"), Ok(None));
        assert!(parse_rank_input("first").is_err());
        assert!(parse_rank_input("inf").is_err());
    }

    #[test]
    fn roster_listing_shows_positions_and_winner() {
        let groups = recompute(&seed_groups(Locale::English));
        let text = render_roster(&groups, &standings(&groups), &ENGLISH);
        assert!(text.contains("**Group 1** leads"));
        assert!(text.contains("**#1 Group 1** 🏆"));
        assert!(text.contains("` 1` ▲ Zhang San: 100 → 80 = 0.2222"));
        assert!(text.contains("` 2` ▼ Li Si: 50 → 55 = -0.0952"));
    }

    #[test]
    fn empty_roster_has_no_winner() {
        let text = render_roster(&[], &standings(&[]), &ENGLISH);
        assert!(text.starts_with("Waiting for ranks"));
    }

    #[test]
    fn unset_values_share_the_placeholder() {
        let mut groups = seed_groups(Locale::English);
        groups[0].records[1].new_rank = None;
        let groups = recompute(&groups);
        let text = render_roster(&groups, &standings(&groups), &ENGLISH);
        assert!(text.contains("` 2` · Li Si: 50 → -- = --"));
        assert_eq!(format_rank(None, ENGLISH.placeholder), format_coefficient(None, ENGLISH.placeholder));
    }

    #[test]
    fn long_text_is_clipped() {
        let clipped = clip(&"x".repeat(2500), MESSAGE_LIMIT);
        assert_eq!(clipped.chars().count(), MESSAGE_LIMIT);
        assert!(clipped.ends_with('…'));
    }
}
