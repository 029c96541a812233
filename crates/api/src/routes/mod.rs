//! HTTP route handlers.

pub mod accounts;
pub mod auth;
pub mod events;
pub mod health;
pub mod invitations;
pub mod od_requests;
