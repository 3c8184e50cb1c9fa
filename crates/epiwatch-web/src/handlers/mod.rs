//! HTTP handlers for all web routes.

pub mod dashboard;
pub mod report;
pub mod search;
pub mod upload;
