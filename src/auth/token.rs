//! Reading claims out of an identity token.
//!
//! The token comes straight from the exchange endpoint over TLS and is only
//! used to lift the identity context into the role request, so the
//! signature is not verified here.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Claim carrying the identity context assertion.
pub const IDENTITY_CONTEXT_CLAIM: &str = "sts:identity_context";

/// Decode the payload segment of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<serde_json::Value> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature)) if !payload.is_empty() => payload,
        _ => bail!("token is not a JWT (expected header.payload.signature)"),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("token payload is not valid base64url")?;
    serde_json::from_slice(&bytes).context("token payload is not valid JSON")
}

/// Pull the identity context assertion out of an identity token.
pub fn identity_context(token: &str) -> Result<String> {
    let claims = decode_claims(token)?;
    claims
        .get(IDENTITY_CONTEXT_CLAIM)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .with_context(|| format!("token has no '{}' claim", IDENTITY_CONTEXT_CLAIM))
}

#[cfg(test)]
pub(crate) fn fake_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}
