//! Request extension marking a call as already tracked.

/// Inserted into request extensions by the first instrumented layer. Any
/// instrumented layer that sees it again passes the call straight through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackedCall;
