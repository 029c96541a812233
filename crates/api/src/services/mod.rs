//! Application services and external integrations.

pub mod attendance;
pub mod auth;
pub mod bootstrap;
pub mod email;

#[allow(unused_imports)] // Used in routes
pub use attendance::AttendanceClient;
#[allow(unused_imports)] // Used in routes
pub use auth::AuthService;
#[allow(unused_imports)] // Used in routes
pub use email::EmailService;
