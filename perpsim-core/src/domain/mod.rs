//! Domain types shared by every stage of the pipeline.

pub mod position;
pub mod price;
pub mod signal;
pub mod trade;

pub use position::Position;
pub use price::{closes, validate_series, volumes, DataError, PricePoint};
pub use signal::{Action, Direction, Signal};
pub use trade::{ExitReason, Trade};
