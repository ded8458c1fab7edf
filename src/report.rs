use crate::stats::PredictionResult;

/// Multi-line summary shown on the result screen and stored in history.
pub fn format_result(r: &PredictionResult) -> String {
    format!(
        "{winner} is projected to beat {loser}!\n\n\
         Expected Score:\n\
         {t1}: {s1:.1}\n\
         {t2}: {s2:.1}\n\n\
         Win Probability: {pct:.1}%\n\
         Expected Margin: {margin:.1} pts\n\
         Total Points: {total:.1}\n\
         95% Score Range:\n\
         \x20  {t1}: {lo1:.0} – {hi1:.0}\n\
         \x20  {t2}: {lo2:.0} – {hi2:.0}",
        winner = r.winner,
        loser = r.loser,
        t1 = r.team1,
        t2 = r.team2,
        s1 = r.score1,
        s2 = r.score2,
        pct = r.win_probability_pct,
        margin = r.margin,
        total = r.total_points,
        lo1 = r.display_range1.low,
        hi1 = r.display_range1.high,
        lo2 = r.display_range2.low,
        hi2 = r.display_range2.high,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ScoreRange;

    #[test]
    fn summary_lists_scores_and_ranges() {
        let r = PredictionResult {
            team1: "Boston Celtics".to_string(),
            team2: "Miami Heat".to_string(),
            score1: 112.34,
            score2: 104.06,
            winner: "Boston Celtics".to_string(),
            loser: "Miami Heat".to_string(),
            team1_win_probability: 0.768,
            win_probability_pct: 76.8,
            margin: 8.28,
            total_points: 216.4,
            display_range1: ScoreRange {
                low: 96.34,
                high: 128.34,
            },
            display_range2: ScoreRange {
                low: 88.06,
                high: 120.06,
            },
        };
        let text = format_result(&r);
        assert!(text.starts_with("Boston Celtics is projected to beat Miami Heat!"));
        assert!(text.contains("Boston Celtics: 112.3\n"));
        assert!(text.contains("Win Probability: 76.8%"));
        assert!(text.contains("Expected Margin: 8.3 pts"));
        assert!(text.contains("   Miami Heat: 88 – 120"));
    }
}
