//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod account;
pub mod event;
pub mod invitation;
pub mod od_request;
pub mod otp;

pub use account::{AccountEntity, RoleDb, StaffSummaryEntity, StudentSummaryEntity};
pub use event::EventEntity;
pub use invitation::{InvitationEntity, InvitationStatusDb};
pub use od_request::{OdRequestEntity, OdStatusDb};
pub use otp::OtpChallengeEntity;
