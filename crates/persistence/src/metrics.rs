//! Query timing and pool gauges.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Times one repository query and reports it as a labelled histogram.
///
/// Dropped without calling [`record`](QueryTimer::record), nothing is
/// emitted; failed queries are reported the same as successful ones.
pub struct QueryTimer {
    name: &'static str,
    started: Instant,
}

impl QueryTimer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            started: Instant::now(),
        }
    }

    pub fn record(self) {
        histogram!("odcse_db_query_duration_seconds", "query" => self.name)
            .record(self.started.elapsed().as_secs_f64());
    }
}

/// Export pool occupancy; sampled periodically by the pool-metrics job.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("odcse_db_pool_connections", "state" => "idle").set(idle as f64);
    gauge!("odcse_db_pool_connections", "state" => "active")
        .set(size.saturating_sub(idle) as f64);
    gauge!("odcse_db_pool_size").set(size as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_timer_holds_name() {
        let timer = QueryTimer::new("find_account_by_email");
        assert_eq!(timer.name, "find_account_by_email");
        timer.record();
    }
}
