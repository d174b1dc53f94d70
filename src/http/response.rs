//! Response assembly.
//!
//! # Responsibilities
//! - Resolve the final content type (store-reported → extension → fallback)
//! - Set disposition by tier: protected objects always download, never render
//! - Attach the verbatim security header set and the cache policy
//! - Emit 206 framing headers when a byte range is being served
//! - Advisory size headers for objects past the recommended limit
//!
//! Headers are assembled exactly once per request and never mutated after the
//! response is handed to the transport.

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::GatewayError;
use crate::http::mime;
use crate::http::range::ByteRange;
use crate::security::access::AccessTier;
use crate::store::ObjectMetadata;

/// Security headers present verbatim on every response, success or error.
pub const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "DENY"),
    ("X-XSS-Protection", "1; mode=block"),
    (
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains; preload",
    ),
    ("Referrer-Policy", "no-referrer"),
    (
        "Permissions-Policy",
        "geolocation=(), microphone=(), camera=()",
    ),
    (
        "Content-Security-Policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

/// Chunk size suggested to clients downloading oversized objects.
const SUGGESTED_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Escape set for the quoted filename parameter: everything except the
/// characters `encodeURIComponent` leaves alone.
const FILENAME_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// `Content-Disposition` value for the object: protected content always
/// downloads as an attachment, public content may render inline.
fn disposition(tier: AccessTier, key: &str) -> String {
    let filename = key.rsplit('/').next().unwrap_or(key);
    let encoded = utf8_percent_encode(filename, FILENAME_ESCAPE);
    match tier {
        AccessTier::Protected => format!("attachment; filename=\"{encoded}\""),
        AccessTier::Public => format!("inline; filename=\"{encoded}\""),
    }
}

/// Assemble the final response for an object (full or partial).
pub fn assemble(
    tier: AccessTier,
    key: &str,
    meta: &ObjectMetadata,
    range: Option<ByteRange>,
    max_recommended_size: u64,
    body: Body,
) -> Result<Response<Body>, GatewayError> {
    let content_type = meta
        .content_type
        .clone()
        .or_else(|| mime::content_type(key).map(str::to_string))
        .unwrap_or_else(|| mime::OCTET_STREAM.to_string());

    let status = if range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, disposition(tier, key))
        .header(header::CACHE_CONTROL, mime::cache_class(key).header_value())
        .header(header::ACCEPT_RANGES, "bytes")
        .header("X-Content-Size", meta.size.to_string())
        .header(
            "X-Content-Size-Human",
            format!("{:.2} MB", megabytes(meta.size)),
        );

    for (name, value) in SECURITY_HEADERS {
        builder = builder.header(name, value);
    }

    if let Some(etag) = &meta.etag {
        builder = builder.header(header::ETAG, etag);
    }

    match range {
        Some(range) => {
            builder = builder
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", range.start, range.end, meta.size),
                )
                .header(header::CONTENT_LENGTH, range.len().to_string());
        }
        None => {
            builder = builder.header(header::CONTENT_LENGTH, meta.size.to_string());
        }
    }

    if meta.size > max_recommended_size {
        builder = builder
            .header(
                "X-Warning",
                format!(
                    "Object size ({:.2} MB) exceeds the recommended limit ({:.2} MB); downloads may hit the platform request ceiling",
                    megabytes(meta.size),
                    megabytes(max_recommended_size)
                ),
            )
            .header("X-Large-File", "true")
            .header("X-Suggested-Chunk-Size", SUGGESTED_CHUNK_SIZE.to_string());
    }

    builder
        .body(body)
        .map_err(|e| GatewayError::Internal(e.to_string()))
}
