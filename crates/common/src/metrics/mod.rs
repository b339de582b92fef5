//! Metrics and observability utilities
//!
//! Prometheus-style metrics with standardized naming for the archive
//! workflows.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all Pressroom metrics
pub const METRICS_PREFIX: &str = "pressroom";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_issue_uploads_total", METRICS_PREFIX),
        Unit::Count,
        "Completed issue bundle uploads"
    );

    describe_histogram!(
        format!("{}_issue_upload_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Issue bundle upload latency in seconds"
    );

    describe_counter!(
        format!("{}_files_uploaded_total", METRICS_PREFIX),
        Unit::Count,
        "Files written to the media store"
    );

    describe_counter!(
        format!("{}_media_deletes_total", METRICS_PREFIX),
        Unit::Count,
        "Remote media delete attempts"
    );

    describe_counter!(
        format!("{}_issue_deletions_total", METRICS_PREFIX),
        Unit::Count,
        "Completed issue deletions"
    );

    describe_counter!(
        format!("{}_files_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Metadata file rows removed by issue deletions"
    );

    tracing::info!("Metrics registered");
}

/// Record a completed issue upload
pub fn record_issue_upload(duration_secs: f64, files: usize) {
    counter!(format!("{}_issue_uploads_total", METRICS_PREFIX)).increment(1);

    counter!(format!("{}_files_uploaded_total", METRICS_PREFIX)).increment(files as u64);

    histogram!(format!("{}_issue_upload_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

/// Record one remote media delete attempt
pub fn record_media_delete(success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_media_deletes_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a completed issue deletion
pub fn record_issue_deletion(files_deleted: u64) {
    counter!(format!("{}_issue_deletions_total", METRICS_PREFIX)).increment(1);
    counter!(format!("{}_files_deleted_total", METRICS_PREFIX)).increment(files_deleted);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_does_not_panic() {
        record_issue_upload(0.25, 3);
        record_media_delete(true);
        record_media_delete(false);
        record_issue_deletion(3);
    }
}
