//! Domain models for ODCSE.

pub mod account;
pub mod auth;
pub mod certificate;
pub mod event;
pub mod invitation;
pub mod od_request;

pub use account::{Account, Role, StaffProfile, StaffSummary, StudentProfile, StudentSummary};
pub use certificate::{Certificate, CertificateRow};
pub use event::Event;
pub use invitation::{Invitation, InvitationDecision, InvitationStatus};
pub use od_request::{Decision, OdRequest, OdStatus, Participant, SupportingDocument};
