/// Classification for retry policy.
///
/// Used by the retrying client to decide whether a failed backend call is
/// re-issued.
///
/// | Class | Re-issued? |
/// |-------|------------|
/// | `Never` | No |
/// | `AfterDelay` | Yes, after the backoff delay, until attempts run out |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// The request failed for a reason a retry cannot fix.
    Never,

    /// The backend asked us to slow down. Wait and re-issue the identical call.
    AfterDelay,
}
