//! Shared-secret check for admin requests.

use axum::http::{header, HeaderMap};
use refresher_core::check_shared_secret;
use subtle::ConstantTimeEq;

use crate::error::{ApiError, Result};

/// Header accepted as an alternative to `Authorization: Bearer`.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Check the caller's secret against the configured one.
///
/// A configured secret that fails the secret policy rejects every request
/// with [`ApiError::NotConfigured`].
pub fn authorize(headers: &HeaderMap, configured: &str) -> Result<()> {
    if check_shared_secret(configured).is_err() {
        return Err(ApiError::NotConfigured);
    }

    let candidate = presented_secret(headers).ok_or(ApiError::Unauthorized)?;
    if bool::from(candidate.as_bytes().ct_eq(configured.trim().as_bytes())) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

fn presented_secret(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    bearer
        .or_else(|| {
            headers
                .get(ADMIN_SECRET_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .filter(|s| !s.is_empty())
}
