//! Reaper — stops groups whose idle window has elapsed (spec.md §4.5).
//!
//! A single long-lived task, modeled on the teacher's
//! `service::background::background_inventory_sync` spawn-and-interval
//! shape.

use std::time::{Duration, Instant};

use crate::state::SharedState;

/// Run the reap sweep forever. Intended to be `tokio::spawn`ed once at
/// startup.
pub async fn run(state: SharedState) {
    let mut interval = tokio::time::interval(state.config.idle_sweep);
    // The first tick fires immediately; skip it so we don't reap before
    // anything has had a chance to be touched.
    interval.tick().await;
    loop {
        interval.tick().await;
        sweep(&state, Instant::now()).await;
    }
}

/// One sweep: evaluate every registered group and stop the ones whose
/// idle window has elapsed and whose container is actually running.
/// Takes a snapshot under the registry's internal locking and releases
/// it before issuing any `stop` (spec.md §5).
pub async fn sweep(state: &SharedState, now: Instant) {
    for candidate in state.registry.iter_for_reap() {
        let idle_window = Duration::from_secs(candidate.idle_seconds);
        if now.saturating_duration_since(candidate.last_touch) <= idle_window {
            continue;
        }
        if state.runtime.is_running(&candidate.container_name).await {
            tracing::info!(
                group = candidate.group,
                container = candidate.container_name,
                "idle window elapsed, reaping container"
            );
            state.runtime.stop(&candidate.container_name).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GateConfig;
    use crate::routes::{RouteTable, Target};
    use crate::runtime::FakeRuntime;
    use std::sync::Arc;

    fn state() -> SharedState {
        let (routes, _tag) = RouteTable::load();
        Arc::new(crate::state::GateState::new(
            GateConfig::default(),
            routes,
            Arc::new(FakeRuntime::default()),
        ))
    }

    fn target() -> Target {
        Target {
            group: "media-asr".to_string(),
            image: "img:latest".to_string(),
            port: 9090,
            health: "/__health".to_string(),
            idle_seconds: 2,
            volumes: vec![],
        }
    }

    #[tokio::test]
    async fn no_reap_before_idle_window_elapses() {
        let state = state();
        let t0 = Instant::now();
        state.registry.touch("media-asr", &target(), t0);
        state
            .runtime
            .start("wake_media-asr", "img", 9090, &[])
            .await;

        sweep(&state, t0 + Duration::from_secs(1)).await;
        assert!(state.runtime.is_running("wake_media-asr").await);
    }

    #[tokio::test]
    async fn reaps_after_idle_window_elapses() {
        let state = state();
        let t0 = Instant::now();
        state.registry.touch("media-asr", &target(), t0);
        state
            .runtime
            .start("wake_media-asr", "img", 9090, &[])
            .await;

        sweep(&state, t0 + Duration::from_secs(3)).await;
        assert!(!state.runtime.is_running("wake_media-asr").await);
    }

    #[tokio::test]
    async fn registry_entry_survives_reap() {
        let state = state();
        let t0 = Instant::now();
        state.registry.touch("media-asr", &target(), t0);
        state
            .runtime
            .start("wake_media-asr", "img", 9090, &[])
            .await;

        sweep(&state, t0 + Duration::from_secs(3)).await;
        assert_eq!(state.registry.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn skips_groups_whose_container_is_not_running() {
        let fake = Arc::new(FakeRuntime::default());
        let (routes, _tag) = RouteTable::load();
        let state = Arc::new(crate::state::GateState::new(
            GateConfig::default(),
            routes,
            fake.clone(),
        ));
        let t0 = Instant::now();
        state.registry.touch("media-asr", &target(), t0);

        // Never started — is_running() is false, so stop() must not be called.
        sweep(&state, t0 + Duration::from_secs(10)).await;
        assert_eq!(fake.stop_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
