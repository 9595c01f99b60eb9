//! Data models for decoded codes, delivery tours and configuration.

pub mod config;
pub mod pharma;
pub mod tour;
