//! Multi-user live transit dashboard bot for GTT Turin.
//!
//! Polls the Muoversi a Torino OpenTripPlanner API on a fixed cycle and
//! keeps per-user Telegram messages updated in place with live arrivals.

pub mod bot;
pub mod config;
pub mod domain;
pub mod engine;
pub mod otp;
pub mod provider;
pub mod store;
pub mod transport;
