//! Metrics recording for store operations.

use std::time::Instant;

/// Records operation metrics for a store call.
///
/// Emits `promptops_store_operations_total` (by status) and
/// `promptops_store_operation_duration_ms`.
///
/// # Examples
///
/// ```
/// use std::time::Instant;
/// use promptops::storage::record_operation_metrics;
///
/// let start = Instant::now();
/// record_operation_metrics("memory", "list", start, "success");
/// ```
pub fn record_operation_metrics(
    backend: &'static str,
    operation: &'static str,
    start: Instant,
    status: &'static str,
) {
    metrics::counter!(
        "promptops_store_operations_total",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "promptops_store_operation_duration_ms",
        "backend" => backend,
        "operation" => operation,
        "status" => status
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}
