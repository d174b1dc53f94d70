//! Byte-range negotiation for partial content requests.
//!
//! # Responsibilities
//! - Parse the `Range` header against a known object size
//! - Clamp requested intervals to the object's bounds
//! - Signal unsatisfiable requests so the server can answer 416
//!
//! Only the single-range form is supported. Multi-range requests are rejected
//! as unsatisfiable because the backing stores only serve one contiguous
//! slice per read. The suffix form `bytes=-N` means "last N bytes".

/// An inclusive byte interval within an object, already clamped to
/// `[0, size - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes covered by the interval.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

/// Outcome of negotiating a `Range` header against an object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No `Range` header was sent; serve the full object.
    Full,
    /// A valid, clamped interval to serve as 206 Partial Content.
    Partial(ByteRange),
    /// Malformed or out-of-bounds request; answer 416.
    Unsatisfiable,
}

/// Negotiate an optional raw `Range` header value against the object size.
pub fn negotiate(header: Option<&str>, size: u64) -> RangeOutcome {
    let Some(raw) = header else {
        return RangeOutcome::Full;
    };

    let Some(spec) = raw.trim().strip_prefix("bytes=") else {
        return RangeOutcome::Unsatisfiable;
    };

    // Multi-range form is unsupported.
    if spec.contains(',') {
        return RangeOutcome::Unsatisfiable;
    }

    let Some((start_str, end_str)) = spec.split_once('-') else {
        return RangeOutcome::Unsatisfiable;
    };

    let (start, end) = if start_str.is_empty() {
        // Suffix form: last N bytes of the object.
        let Ok(suffix_len) = end_str.parse::<u64>() else {
            return RangeOutcome::Unsatisfiable;
        };
        if suffix_len == 0 || size == 0 {
            return RangeOutcome::Unsatisfiable;
        }
        (size.saturating_sub(suffix_len), size - 1)
    } else {
        let Ok(start) = start_str.parse::<u64>() else {
            return RangeOutcome::Unsatisfiable;
        };
        if start >= size {
            return RangeOutcome::Unsatisfiable;
        }
        let end = if end_str.is_empty() {
            size - 1
        } else {
            let Ok(end) = end_str.parse::<u64>() else {
                return RangeOutcome::Unsatisfiable;
            };
            end.min(size - 1)
        };
        (start, end)
    };

    if start > end {
        return RangeOutcome::Unsatisfiable;
    }

    RangeOutcome::Partial(ByteRange { start, end })
}
