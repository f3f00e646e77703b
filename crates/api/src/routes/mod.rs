//! HTTP Route Handlers

pub mod admin;
pub mod cars;
pub mod dashboard;
pub mod predict;
