pub mod elliott;
pub mod engine;
pub mod harmonic;
pub mod ichimoku;
pub mod levels;
pub mod pivots;
pub mod ta;

pub use self::engine::{compute_snapshot, IndicatorSnapshot, MaCrossValue};
pub use self::ta::{BollingerValue, MacdValue, StochasticValue};
