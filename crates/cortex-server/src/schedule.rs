//! Arms the lifecycle tick on a timer (SPEC_FULL §4.6/§6.1: scheduling is a
//! `cortex-server` concern). Grounded on the teacher's own periodic-consolidation
//! loop in `main.rs`: a `tokio::spawn`ed loop with a fixed sleep, not a full cron
//! scheduler. `lifecycle.schedule` only needs its hour-step recognized (`"0 */N *
//! * *"`, the only shape Cortex's own defaults use); anything else falls back to
//! the same 6-hour default the teacher uses, with a warning logged once at boot.

use std::sync::Arc;

use cortex_core::Cortex;

/// Extracts `N` from a `"0 */N * * *"` cron string; `None` for anything else.
fn parse_hourly_step(schedule: &str) -> Option<u64> {
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    let hour_field = fields.get(1)?;
    hour_field.strip_prefix("*/")?.parse().ok()
}

pub fn spawn(cortex: Arc<Cortex>, schedule: &str) {
    let interval_hours = parse_hourly_step(schedule).unwrap_or_else(|| {
        tracing::warn!(
            schedule,
            "could not parse lifecycle schedule as an hourly step, defaulting to 6 hours"
        );
        6
    });

    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(interval_hours * 3600)).await;
            match cortex.lifecycle.run(false).await {
                Ok(report) => {
                    tracing::info!(
                        decayed = report.decayed,
                        promoted = report.promoted,
                        merged = report.merged,
                        archived = report.archived,
                        compressed_groups = report.compressed_groups,
                        profiles_synthesized = report.profiles_synthesized,
                        "lifecycle tick complete"
                    );
                }
                Err(err) => {
                    tracing::warn!(error = %err, "lifecycle tick failed");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hourly_step() {
        assert_eq!(parse_hourly_step("0 */6 * * *"), Some(6));
        assert_eq!(parse_hourly_step("*/15 * * * *"), None);
        assert_eq!(parse_hourly_step("garbage"), None);
    }
}
