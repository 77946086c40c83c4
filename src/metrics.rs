use tracing::trace;

// Trace-backed counters; the Prometheus recorder only serves `/metrics`.

pub fn inc_requests(route: &'static str) {
    trace!(
        target = "farbarter.metrics",
        route = route,
        "requests_total_inc"
    );
}

pub fn stage_elapsed(stage: &'static str, elapsed_ms: u128) {
    trace!(
        target = "farbarter.metrics",
        stage = stage,
        elapsed_ms = elapsed_ms as u64,
        "stage_elapsed"
    );
}

pub fn metadata_fallback(listing_id: u64) {
    trace!(
        target = "farbarter.metrics",
        listing_id = listing_id,
        "metadata_fallback_total_inc"
    );
}
