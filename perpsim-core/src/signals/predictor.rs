//! Price prediction seam used by the deviation rule.

/// Predicts a future close from the closes seen so far.
///
/// Implementations must only look at `closes` (bars up to and including the
/// current one).
pub trait PricePredictor: Send + Sync {
    fn name(&self) -> &str;

    /// Predicted close, or `None` when there is not enough history.
    fn predict(&self, closes: &[f64]) -> Option<f64>;
}

/// Ordinary least-squares line through the last `window` closes,
/// extrapolated `horizon` bars past the current bar.
#[derive(Debug, Clone)]
pub struct LinearTrendPredictor {
    window: usize,
    horizon: usize,
}

impl LinearTrendPredictor {
    pub fn new(window: usize, horizon: usize) -> Self {
        assert!(window >= 2, "trend window must be >= 2");
        Self { window, horizon }
    }
}

impl Default for LinearTrendPredictor {
    fn default() -> Self {
        Self::new(20, 5)
    }
}

impl PricePredictor for LinearTrendPredictor {
    fn name(&self) -> &str {
        "linear_trend"
    }

    fn predict(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.window {
            return None;
        }
        let ys = &closes[closes.len() - self.window..];
        let n = ys.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = ys.iter().sum::<f64>() / n;

        let mut cov = 0.0;
        let mut var = 0.0;
        for (i, &y) in ys.iter().enumerate() {
            let dx = i as f64 - x_mean;
            cov += dx * (y - y_mean);
            var += dx * dx;
        }
        let slope = cov / var;
        let last_x = n - 1.0;
        let intercept = y_mean - slope * x_mean;
        Some(intercept + slope * (last_x + self.horizon as f64))
    }
}

/// Predicts no change. Disables the deviation rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChangePredictor;

impl PricePredictor for NoChangePredictor {
    fn name(&self) -> &str {
        "no_change"
    }

    fn predict(&self, closes: &[f64]) -> Option<f64> {
        closes.last().copied()
    }
}
