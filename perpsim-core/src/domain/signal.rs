//! Trading decisions emitted by the signal rules.

use serde::{Deserialize, Serialize};

/// Discrete action for the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Position direction an action would open, if any.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Buy => Some(Direction::Long),
            Self::Sell => Some(Direction::Short),
            Self::Hold => None,
        }
    }
}

/// Side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// +1.0 for long, -1.0 for short.
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }

    /// Action that opens a position on this side.
    pub fn entry_action(self) -> Action {
        match self {
            Self::Long => Action::Buy,
            Self::Short => Action::Sell,
        }
    }
}

/// A decision for one bar. Recomputed every bar, never stored long-term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub action: Action,
    /// Conviction in `[0, 1]`. Always 0 for `Hold`.
    pub confidence: f64,
}

impl Signal {
    pub fn new(action: Action, confidence: f64) -> Self {
        if action == Action::Hold {
            return Self::hold();
        }
        Self {
            action,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn hold() -> Self {
        Self {
            action: Action::Hold,
            confidence: 0.0,
        }
    }

    pub fn buy(confidence: f64) -> Self {
        Self::new(Action::Buy, confidence)
    }

    pub fn sell(confidence: f64) -> Self {
        Self::new(Action::Sell, confidence)
    }

    pub fn is_hold(&self) -> bool {
        self.action == Action::Hold
    }

    /// Whether this signal asks to be on the other side of `direction`.
    pub fn reverses(&self, direction: Direction) -> bool {
        self.action.direction() == Some(direction.opposite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_has_zero_confidence() {
        let s = Signal::new(Action::Hold, 0.9);
        assert_eq!(s.confidence, 0.0);
        assert!(s.is_hold());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Signal::buy(1.7).confidence, 1.0);
        assert_eq!(Signal::sell(-0.2).confidence, 0.0);
    }

    #[test]
    fn reversal_detection() {
        assert!(Signal::sell(0.6).reverses(Direction::Long));
        assert!(Signal::buy(0.6).reverses(Direction::Short));
        assert!(!Signal::buy(0.6).reverses(Direction::Long));
        assert!(!Signal::hold().reverses(Direction::Long));
    }

    #[test]
    fn action_serializes_lowercase() {
        let json = serde_json::to_string(&Action::Buy).unwrap();
        assert_eq!(json, "\"buy\"");
        let dir: Direction = serde_json::from_str("\"short\"").unwrap();
        assert_eq!(dir, Direction::Short);
    }
}
