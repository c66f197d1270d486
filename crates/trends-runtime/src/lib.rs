//! Runtime layer for Overdose Trends.
//!
//! Owns the loaded dataset between queries: callers get a shared handle to a
//! fully built [`trends_data::analysis::DatasetAnalysis`] and never observe a
//! partially rebuilt one.

pub mod dataset_manager;

pub use trends_core as core;
pub use trends_data as data;
