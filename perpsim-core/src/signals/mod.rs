//! Signal generation: indicator rules, the perp direction rule and the
//! price prediction seam.

pub mod perpetual;
pub mod predictor;
pub mod rules;

pub use perpetual::{average_funding_rate, resolve_perp_direction, PerpDecision};
pub use predictor::{LinearTrendPredictor, NoChangePredictor, PricePredictor};
pub use rules::{BarContext, SignalConfig, SignalGenerator, HISTOGRAM_EPSILON};
