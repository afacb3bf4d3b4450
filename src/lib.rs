//! Tillflow Billing - Subscription and Entitlement Engine
//!
//! This crate implements trial bootstrapping, paid subscription checkout,
//! payment webhook processing, and per-request entitlement gating for the
//! Tillflow POS platform.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
