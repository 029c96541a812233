//! Repository implementations for database operations.

pub mod account;
pub mod event;
pub mod invitation;
pub mod od_request;
pub mod otp;

pub use account::AccountRepository;
pub use event::{EventRepository, NewEvent};
pub use invitation::{InvitationRepository, NewInvitation};
pub use od_request::{DecisionUpdate, NewOdRequest, OdRequestRepository};
pub use otp::OtpRepository;
