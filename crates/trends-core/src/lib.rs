//! Core value types and shared utilities for Overdose Trends.
//!
//! Defines the record, catalog and chart-point types that flow through the
//! ingestion pipeline, the fixed calendar-month ordering, the error taxonomy
//! and the CLI settings layer.

pub mod error;
pub mod formatting;
pub mod models;
pub mod months;
pub mod settings;
