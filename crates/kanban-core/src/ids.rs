use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp id. Strictly increasing for the lifetime of the
/// process, even when two ids are requested within the same millisecond.
pub(crate) fn time_id(now: DateTime<Utc>) -> String {
    let candidate = now.timestamp_millis();
    let mut last = LAST_ISSUED.load(Ordering::Relaxed);
    loop {
        let next = candidate.max(last + 1);
        match LAST_ISSUED.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}
