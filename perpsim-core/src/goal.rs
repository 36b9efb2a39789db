//! Long-horizon goal tracking and milestone risk throttling.
//!
//! The tracker compares the current account value against a fixed goal and
//! horizon. Each milestone carries a risk adjustment factor; the factors
//! strictly decrease up the ladder, so risk appetite shrinks as the goal
//! approaches.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::sizers::BASE_RISK_FRACTION;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub target: f64,
    pub description: String,
    pub risk_adjustment: f64,
}

impl Milestone {
    fn new(target: f64, description: &str, risk_adjustment: f64) -> Self {
        Self {
            target,
            description: description.to_string(),
            risk_adjustment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalConfig {
    pub goal: f64,
    pub horizon_days: f64,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            goal: 1_000_000.0,
            horizon_days: 5.0 * DAYS_PER_YEAR,
        }
    }
}

/// Progress snapshot returned by [`GoalTracker::progress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub current_value: f64,
    pub percentage_to_goal: f64,
    /// `f64::INFINITY` when the current growth rate is not positive.
    /// Serialized as `null` in that case.
    #[serde(with = "infinite_as_null")]
    pub projected_days_to_goal: f64,
    pub current_growth_rate: f64,
    pub required_growth_rate: f64,
    pub next_milestone: Milestone,
}

#[derive(Debug, Clone)]
pub struct GoalTracker {
    config: GoalConfig,
    milestones: Vec<Milestone>,
}

impl Default for GoalTracker {
    fn default() -> Self {
        Self::new(GoalConfig::default())
    }
}

impl GoalTracker {
    pub fn new(config: GoalConfig) -> Self {
        Self {
            config,
            milestones: default_milestones(),
        }
    }

    pub fn config(&self) -> &GoalConfig {
        &self.config
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// First milestone strictly above `current_value`, or the last one once
    /// every target has been passed.
    pub fn current_milestone(&self, current_value: f64) -> &Milestone {
        self.milestones
            .iter()
            .find(|m| m.target > current_value)
            .unwrap_or(&self.milestones[self.milestones.len() - 1])
    }

    pub fn risk_adjustment(&self, current_value: f64) -> f64 {
        self.current_milestone(current_value).risk_adjustment
    }

    /// Annualized daily compound rate needed to reach the goal in the
    /// remaining horizon. 0 once the horizon has elapsed.
    pub fn required_growth_rate(&self, current_value: f64, days_elapsed: f64) -> f64 {
        let remaining = self.config.horizon_days - days_elapsed;
        if remaining <= 0.0 || current_value <= 0.0 {
            return 0.0;
        }
        let daily = (self.config.goal / current_value).powf(1.0 / remaining) - 1.0;
        daily * DAYS_PER_YEAR
    }

    /// Geometric mean of the daily returns, compounded over a year.
    pub fn current_growth_rate(&self, recent_daily_returns: &[f64]) -> f64 {
        if recent_daily_returns.is_empty() {
            return 0.0;
        }
        let mut log_sum = 0.0;
        for r in recent_daily_returns {
            let growth = 1.0 + r;
            if growth <= 0.0 {
                // Total loss on some day wipes out the compounded series.
                return -1.0;
            }
            log_sum += growth.ln();
        }
        let g = (log_sum / recent_daily_returns.len() as f64).exp() - 1.0;
        (1.0 + g).powf(DAYS_PER_YEAR) - 1.0
    }

    /// Days to reach the goal at `annual_rate`, or infinity if the rate is
    /// not positive.
    pub fn projected_days_to_goal(&self, current_value: f64, annual_rate: f64) -> f64 {
        if annual_rate <= 0.0 || current_value <= 0.0 {
            return f64::INFINITY;
        }
        let daily = (1.0 + annual_rate).powf(1.0 / DAYS_PER_YEAR) - 1.0;
        (self.config.goal / current_value).ln() / (1.0 + daily).ln()
    }

    pub fn progress(
        &self,
        current_value: f64,
        days_elapsed: f64,
        recent_daily_returns: &[f64],
    ) -> GoalProgress {
        let current_growth_rate = self.current_growth_rate(recent_daily_returns);
        GoalProgress {
            current_value,
            percentage_to_goal: current_value / self.config.goal * 100.0,
            projected_days_to_goal: self.projected_days_to_goal(current_value, current_growth_rate),
            current_growth_rate,
            required_growth_rate: self.required_growth_rate(current_value, days_elapsed),
            next_milestone: self.current_milestone(current_value).clone(),
        }
    }

    /// Dollar value to commit to a trade given the milestone factor.
    pub fn suggest_position_value(&self, current_value: f64, volatility: f64, confidence: f64) -> f64 {
        let factor = self.risk_adjustment(current_value);
        let vol_scale = (1.0 - volatility).clamp(0.0, 1.0);
        current_value * BASE_RISK_FRACTION * factor * vol_scale * confidence.clamp(0.0, 1.0)
    }

    /// Multi-line human readable progress report.
    pub fn summary(&self, progress: &GoalProgress) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Current progress:");
        let _ = writeln!(out, "  value:          ${:.2}", progress.current_value);
        let _ = writeln!(
            out,
            "  progress:       {:.2}% to ${:.0} goal",
            progress.percentage_to_goal, self.config.goal
        );
        let _ = writeln!(
            out,
            "  growth rate:    {:.2}% annually",
            progress.current_growth_rate * 100.0
        );
        let _ = writeln!(
            out,
            "  required rate:  {:.2}% annually",
            progress.required_growth_rate * 100.0
        );
        let _ = writeln!(
            out,
            "  next milestone: ${:.0} ({})",
            progress.next_milestone.target, progress.next_milestone.description
        );
        if progress.projected_days_to_goal.is_finite() {
            let status = if progress.projected_days_to_goal < self.config.horizon_days {
                "ahead of schedule"
            } else {
                "behind schedule"
            };
            let _ = write!(
                out,
                "  projection:     {} days to goal ({status})",
                progress.projected_days_to_goal.abs().round()
            );
        } else {
            let _ = write!(out, "  projection:     needs a positive growth rate");
        }
        out
    }
}

mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

fn default_milestones() -> Vec<Milestone> {
    vec![
        Milestone::new(1_000.0, "Initial Growth Phase", 1.0),
        Milestone::new(10_000.0, "Early Momentum", 0.9),
        Milestone::new(50_000.0, "Acceleration Phase", 0.8),
        Milestone::new(100_000.0, "Six Figure Milestone", 0.7),
        Milestone::new(250_000.0, "Quarter Million", 0.6),
        Milestone::new(500_000.0, "Halfway Point", 0.5),
        Milestone::new(750_000.0, "Final Stretch", 0.4),
        Milestone::new(1_000_000.0, "Goal Achievement", 0.3),
    ]
}
