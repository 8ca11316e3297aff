use std::sync::atomic::{AtomicU64, Ordering};

use busrpc_types::RequestId;

/// Process-wide monotone allocator. Wraps past zero by skipping it, since
/// `request_id == 0` is invalid on the wire. Request-ids only need to be
/// unique among a caller's currently outstanding calls, not globally, but
/// a single shared counter is simpler and cheap enough to not matter.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

#[must_use]
pub fn next_request_id() -> RequestId {
    let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    if id == 0 {
        return next_request_id();
    }
    RequestId(id)
}

#[cfg(test)]
mod tests {
    use super::next_request_id;

    #[test]
    fn never_yields_zero() {
        for _ in 0..1000 {
            assert!(next_request_id().is_valid());
        }
    }

    #[test]
    fn is_monotone_within_a_run() {
        let a = next_request_id();
        let b = next_request_id();
        assert!(b.0 > a.0);
    }
}
