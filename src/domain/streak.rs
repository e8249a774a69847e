/// Streak calculation for daily habits
///
/// This module derives a habit's streak figures from its completion days.
/// Evaluation is a pure function of (completion days, reference day,
/// previously recorded best): nothing is read from the clock and nothing
/// passed in is modified.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calculated streak information for a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Consecutive days ending today or yesterday
    pub current_streak: u32,
    /// Longest consecutive run anywhere in the history
    pub longest_streak: u32,
    /// Best streak ever recorded, never lower than the previous best
    pub best_streak: u32,
    /// Whether this evaluation raised the best streak
    pub best_streak_updated: bool,
    /// When the habit was last completed (None if never completed)
    pub last_completed: Option<NaiveDate>,
    /// Number of distinct completed days
    pub total_completions: u32,
}

impl Streak {
    /// Streak figures for a habit that has never been completed
    pub fn empty(previous_best: u32) -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            best_streak: previous_best,
            best_streak_updated: false,
            last_completed: None,
            total_completions: 0,
        }
    }

    /// Evaluate streaks for a set of completion days
    ///
    /// `today` anchors the current streak: a run counts as live when its most
    /// recent day is `today` or the day before. Days later than `today` are
    /// ignored for the current streak but still count towards the longest run.
    pub fn evaluate<I>(days: I, today: NaiveDate, previous_best: u32) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut days: Vec<NaiveDate> = days.into_iter().collect();
        if days.is_empty() {
            return Self::empty(previous_best);
        }

        // Newest first
        days.sort_unstable_by(|a, b| b.cmp(a));

        let (longest_streak, total_completions) = Self::longest_run(&days);
        let current_streak = Self::current_run(&days, today);
        let best_streak = previous_best.max(longest_streak).max(current_streak);

        Self {
            current_streak,
            longest_streak,
            best_streak,
            best_streak_updated: best_streak > previous_best,
            last_completed: days.first().copied(),
            total_completions,
        }
    }

    /// Check if the streak is still alive on `today`
    pub fn is_live(&self, today: NaiveDate) -> bool {
        self.last_completed
            .map(|last| (0..=1).contains(&(today - last).num_days()))
            .unwrap_or(false)
    }

    /// Get a motivational message based on current streak status
    pub fn motivational_message(&self) -> String {
        match self.current_streak {
            0 => "Ready to start your streak! Every journey begins with a single step.".to_string(),
            1 => "Great start! One day down, keep the momentum going.".to_string(),
            2..=6 => format!("Nice work! {} days in a row. You're building a strong habit.", self.current_streak),
            7..=13 => format!("Excellent! {} days strong. You're in the groove now!", self.current_streak),
            14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", self.current_streak),
            30..=99 => format!("Incredible! {} days of consistency. You're a habit master!", self.current_streak),
            _ => format!("Legendary! {} days of unwavering commitment. You're an inspiration!", self.current_streak),
        }
    }

    /// Longest run of consecutive days plus the number of distinct days
    ///
    /// Expects `days` sorted newest first.
    fn longest_run(days: &[NaiveDate]) -> (u32, u32) {
        let mut longest = 1;
        let mut run = 1;
        let mut distinct = 1;

        for pair in days.windows(2) {
            match (pair[0] - pair[1]).num_days() {
                0 => {
                    tracing::warn!(
                        day = %pair[0],
                        "completion ledger holds more than one completion for the same day, ignoring duplicate"
                    );
                }
                1 => {
                    run += 1;
                    distinct += 1;
                }
                _ => {
                    longest = longest.max(run);
                    run = 1;
                    distinct += 1;
                }
            }
        }

        (longest.max(run), distinct)
    }

    /// Run of consecutive days ending at `today` or yesterday
    ///
    /// Expects `days` sorted newest first.
    fn current_run(days: &[NaiveDate], today: NaiveDate) -> u32 {
        let yesterday = today - chrono::Duration::days(1);
        let mut recent = days.iter().copied().skip_while(|day| *day > today);

        let mut expected = match recent.next() {
            Some(day) if day == today || day == yesterday => day,
            _ => return 0,
        };

        let mut run = 1;
        for day in recent {
            match (expected - day).num_days() {
                0 => continue,
                1 => {
                    run += 1;
                    expected = day;
                }
                _ => break,
            }
        }

        run
    }
}
