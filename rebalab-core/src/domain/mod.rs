//! Domain types shared across the engine.

pub mod equity;
pub mod event;
pub mod portfolio;
pub mod price;

pub use equity::EquityPoint;
pub use event::{RebalanceEvent, SkippedTrade, TradeAction};
pub use portfolio::PortfolioState;
pub use price::{PricePoint, PriceSeries};
