//! Statistics module - aggregation and descriptive calculations

pub mod aggregator;
pub mod calculator;

pub use aggregator::{aggregate, map_center, RegionSummary};
pub use calculator::{StatsCalculator, ValueSummary};
