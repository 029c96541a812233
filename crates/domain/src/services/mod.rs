//! Domain services for ODCSE.
//!
//! Services contain pure business logic that operates on domain models.

pub mod certificate;
pub mod workflow;
