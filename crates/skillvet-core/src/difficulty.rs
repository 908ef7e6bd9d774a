//! Adaptive difficulty controller.
//!
//! Consumes performance quality and timing signals from evaluated turns and
//! emits the next target difficulty.

use std::collections::VecDeque;

use crate::model::{MAX_DIFFICULTY, MIN_DIFFICULTY};

/// Seconds of expected thinking time per difficulty point.
const SECS_PER_DIFFICULTY_POINT: f64 = 30.0;

/// Rolling history bound; the trend only ever looks at the last three
/// samples.
const HISTORY_CAPACITY: usize = 16;

/// Adaptive scalar controller over the difficulty domain.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    current: f64,
    initial: f64,
    min: f64,
    max: f64,
    /// Normalized response quality (0..1) of recent answers, oldest first.
    history: VecDeque<f64>,
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(5.0, MIN_DIFFICULTY, MAX_DIFFICULTY)
    }
}

impl DifficultyController {
    pub fn new(initial: f64, min: f64, max: f64) -> Self {
        let initial = initial.clamp(min, max);
        Self {
            current: initial,
            initial,
            min,
            max,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Consume one evaluated turn and return the new difficulty.
    ///
    /// Adjustment terms:
    /// 1. quality tier: >=0.8 -> +1.5, >=0.6 -> +0.5, >=0.4 -> -1.0,
    ///    else -2.0
    /// 2. timing against expected time (difficulty x 30s): fast -> +0.5,
    ///    slow -> -0.5
    /// 3. trend over the last three samples once available: improving
    ///    -> +0.3, declining -> -0.3
    pub fn calculate_adjustment(
        &mut self,
        quality: f64,
        time_taken_secs: f64,
        question_difficulty: f64,
    ) -> f64 {
        let quality = quality.clamp(0.0, 1.0);

        let mut adjustment = if quality >= 0.8 {
            1.5
        } else if quality >= 0.6 {
            0.5
        } else if quality >= 0.4 {
            -1.0
        } else {
            -2.0
        };

        let expected_secs = question_difficulty * SECS_PER_DIFFICULTY_POINT;
        if time_taken_secs < expected_secs * 0.7 {
            adjustment += 0.5;
        } else if time_taken_secs > expected_secs * 2.0 {
            adjustment -= 0.5;
        }

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(quality);

        if self.history.len() >= 3 {
            let trend = self.recent_trend();
            if trend > 0.1 {
                adjustment += 0.3;
            } else if trend < -0.1 {
                adjustment -= 0.3;
            }
        }

        self.current = (self.current + adjustment).clamp(self.min, self.max);
        self.current
    }

    /// Slope proxy over the last three quality samples.
    fn recent_trend(&self) -> f64 {
        let n = self.history.len();
        if n < 3 {
            return 0.0;
        }
        (self.history[n - 1] - self.history[n - 3]) / 2.0
    }

    /// Clear history and restore the initial difficulty. Used between
    /// independent sessions sharing a controller instance.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.history.clear();
    }

    /// Human-readable band name for a difficulty value.
    pub fn band(difficulty: f64) -> &'static str {
        if difficulty <= 3.0 {
            "Basic"
        } else if difficulty <= 6.0 {
            "Intermediate"
        } else if difficulty <= 8.0 {
            "Advanced"
        } else {
            "Expert"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_fast_answer_raises_difficulty() {
        let mut controller = DifficultyController::default();
        // quality tier +1.5, fast bonus +0.5
        let next = controller.calculate_adjustment(0.9, 10.0, 5.0);
        assert!((next - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn poor_slow_answer_lowers_difficulty() {
        let mut controller = DifficultyController::default();
        // quality tier -2.0, slow penalty -0.5
        let next = controller.calculate_adjustment(0.1, 500.0, 5.0);
        assert!((next - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn neutral_timing_has_no_timing_term() {
        let mut controller = DifficultyController::default();
        // expected = 150s; 140s is neither fast (<105) nor slow (>300)
        let next = controller.calculate_adjustment(0.7, 140.0, 5.0);
        assert!((next - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn stays_in_domain_under_extreme_inputs() {
        let mut controller = DifficultyController::default();
        for _ in 0..20 {
            let d = controller.calculate_adjustment(1.0, 0.0, 10.0);
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d));
        }
        assert_eq!(controller.current(), MAX_DIFFICULTY);

        for _ in 0..20 {
            let d = controller.calculate_adjustment(0.0, 10_000.0, 1.0);
            assert!((MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d));
        }
        assert_eq!(controller.current(), MIN_DIFFICULTY);
    }

    #[test]
    fn declining_trend_contributes_negative_term() {
        // Quality sequence [0.9, 0.85, 0.3]: on the third sample the trend is
        // (0.3 - 0.9) / 2 = -0.3 < -0.1, adding -0.3 on top of the tier and
        // timing terms. Compare against a controller seeing 0.3 with no
        // history from the same starting point.
        let with_history_delta = {
            let mut controller = DifficultyController::default();
            controller.calculate_adjustment(0.9, 150.0, 5.0);
            controller.calculate_adjustment(0.85, 150.0, 5.0);
            let before = controller.current();
            controller.calculate_adjustment(0.3, 150.0, 5.0) - before
        };
        let trendless_delta = {
            let mut controller = DifficultyController::default();
            let before = controller.current();
            controller.calculate_adjustment(0.3, 150.0, 5.0) - before
        };
        assert!(
            with_history_delta < trendless_delta,
            "declining history should push harder downward: {with_history_delta} vs {trendless_delta}"
        );
        assert!((with_history_delta - (trendless_delta - 0.3)).abs() < f64::EPSILON);
    }

    #[test]
    fn history_is_bounded() {
        let mut controller = DifficultyController::default();
        for _ in 0..100 {
            controller.calculate_adjustment(0.5, 60.0, 5.0);
        }
        assert!(controller.history.len() <= HISTORY_CAPACITY);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut controller = DifficultyController::new(6.0, 1.0, 10.0);
        controller.calculate_adjustment(0.9, 10.0, 5.0);
        assert!(controller.current() > 6.0);
        controller.reset();
        assert_eq!(controller.current(), 6.0);
        assert!(controller.history.is_empty());
    }

    #[test]
    fn band_names() {
        assert_eq!(DifficultyController::band(2.0), "Basic");
        assert_eq!(DifficultyController::band(5.0), "Intermediate");
        assert_eq!(DifficultyController::band(7.5), "Advanced");
        assert_eq!(DifficultyController::band(9.5), "Expert");
    }
}
