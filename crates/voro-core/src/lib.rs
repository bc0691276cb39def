//! Core library for Voro.
//!
//! Contains the intake token codec, the mail dispatcher and its transports,
//! the intake brief model, and the per-source rate limiter. This crate knows
//! nothing about HTTP; the server crate wires these pieces into routes.

pub mod brief;
pub mod error;
pub mod mail;
pub mod rate_limit;
pub mod token;
