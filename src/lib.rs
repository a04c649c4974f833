//! Volunteer engagement and points ledger
//!
//! Volunteers apply to opportunities posted by promoters, earn points when a promoter concludes an
//! opportunity and confirms their participation, and spend those points on benefits.

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod ports;
pub mod queries;
pub mod telemetry;
