//! Shared configuration and error types for the vCalendar importer.

pub mod config;
pub mod error;
