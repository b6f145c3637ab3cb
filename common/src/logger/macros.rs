use tracing::{Span, field};

use super::TraceId;

/// Create a root span for a refresh cycle or request.
///
/// `symbol` starts empty and is filled in by code that narrows down to a
/// single instrument.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id,
        symbol = field::Empty
    )
}

/// Create a child span (inherits trace_id from the current root)
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name, symbol = field::Empty)
}
