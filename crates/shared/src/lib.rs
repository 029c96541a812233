//! Shared utilities and common types for the ODCSE backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (OTP hashing, constant-time comparison)
//! - Password hashing with Argon2id
//! - JWT session tokens
//! - Common validation logic

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
