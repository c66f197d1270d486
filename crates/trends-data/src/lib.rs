//! Data ingestion layer for Overdose Trends.
//!
//! Responsible for discovering and parsing the source CSV files, filtering
//! and accumulating monthly death counts per drug, deriving chart-ready
//! series, and running the top-level load pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod series;

pub use trends_core as core;
