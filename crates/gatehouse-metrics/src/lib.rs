//! Metrics instrumentation for gatehouse.
//!
//! Counters are recorded through the `metrics` facade; the embedding
//! server decides which exporter (if any) is installed.

use metrics::counter;

// ============================================================================
// Metric Names
// ============================================================================

/// Requests accepted by a method.
pub const AUTH_ACCEPT_TOTAL: &str = "gatehouse_auth_accept_total";
/// Requests rejected by a method (credentials present but invalid, or backend failure).
pub const AUTH_REJECT_TOTAL: &str = "gatehouse_auth_reject_total";
/// Requests every enabled method declined.
pub const AUTH_UNAUTHENTICATED_TOTAL: &str = "gatehouse_auth_unauthenticated_total";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a request accepted by `method`.
#[inline]
pub fn record_auth_accept(method: &'static str) {
    counter!(AUTH_ACCEPT_TOTAL, "method" => method).increment(1);
}

/// Record a request rejected by `method`, classified by error kind.
#[inline]
pub fn record_auth_reject(method: &'static str, kind: &'static str) {
    counter!(AUTH_REJECT_TOTAL, "method" => method, "kind" => kind).increment(1);
}

/// Record a request that no method claimed.
#[inline]
pub fn record_auth_unauthenticated(listener: &str) {
    counter!(AUTH_UNAUTHENTICATED_TOTAL, "listener" => listener.to_owned()).increment(1);
}
