pub mod champion_stats;
pub mod metrics;
pub mod report;
pub mod summary;
