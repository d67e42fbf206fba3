pub mod models;
pub mod okx;

pub use models::{Candle, CandleData, TimeframeSpec};
pub use okx::{CandleFetcher, FetchError, OkxClient};
