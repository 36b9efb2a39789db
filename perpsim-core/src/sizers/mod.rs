//! Position sizing — turns a decision into a concrete order.
//!
//! The sizer is signal-agnostic: it never decides whether to trade, only how
//! much, at what leverage and with which protective brackets.

pub mod risk_budget;

pub use risk_budget::{PositionSizer, SizedOrder, SizingRequest, BASE_RISK_FRACTION};
