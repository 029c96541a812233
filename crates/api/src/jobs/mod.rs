//! Background job scheduler and job implementations.

mod cleanup_invitations;
mod cleanup_otps;
mod pool_metrics;
mod scheduler;

pub use cleanup_invitations::CleanupInvitationsJob;
pub use cleanup_otps::CleanupOtpsJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::JobScheduler;
