//! Domain layer for the ODCSE backend.
//!
//! This crate contains:
//! - Domain models and request/response DTOs (accounts, OTP flow, events,
//!   invitations, OD requests, certificates)
//! - Pure business logic: the OD request and invitation state machines,
//!   draft validation, participant reconciliation, certificate assembly

pub mod models;
pub mod services;
