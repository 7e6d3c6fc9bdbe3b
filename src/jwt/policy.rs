//! Issuer, audience and time rules applied after the signature checks out.
//!
//! # Design Decisions
//! - Checks run in a fixed order: iss, aud, exp, nbf
//! - `validate_policy` takes `now` as an argument so it stays pure
//! - Leeway widens both the exp and nbf windows by the same amount

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::alg::JwtAlg;
use super::claims::{get_int, get_str, ClaimMap};
use super::error::{ErrorCode, JwtError, JwtResult};

/// Verification policy snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Policy {
    /// Algorithms accepted in the `alg` header. Empty accepts all.
    pub allowed_algs: Vec<JwtAlg>,

    /// Required `iss` value.
    pub expected_iss: Option<String>,

    /// Required `aud` value.
    pub expected_aud: Option<String>,

    /// Clock-skew tolerance in seconds.
    pub leeway_seconds: i64,

    pub require_exp: bool,

    pub require_nbf: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allowed_algs: Vec::new(),
            expected_iss: None,
            expected_aud: None,
            leeway_seconds: 0,
            require_exp: true,
            require_nbf: false,
        }
    }
}

impl Policy {
    pub fn allows(&self, alg: JwtAlg) -> bool {
        self.allowed_algs.is_empty() || self.allowed_algs.contains(&alg)
    }
}

/// Engine-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineOptions {
    pub policy: Policy,

    /// Passed on to the crypto provider via `request_thread_safety`.
    pub thread_safe: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            policy: Policy::default(),
            thread_safe: true,
        }
    }
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Check decoded claims against `policy` at time `now`.
pub fn validate_policy(policy: &Policy, claims: &ClaimMap, now: i64) -> JwtResult<()> {
    if let Some(expected) = &policy.expected_iss {
        if get_str(claims, "iss") != Some(expected.as_str()) {
            return Err(JwtError::new(
                ErrorCode::InvalidIssuer,
                "Issuer claim does not match policy",
            ));
        }
    }

    if let Some(expected) = &policy.expected_aud {
        if get_str(claims, "aud") != Some(expected.as_str()) {
            return Err(JwtError::new(
                ErrorCode::InvalidAudience,
                "Audience claim does not match policy",
            ));
        }
    }

    if policy.require_exp {
        let exp = get_int(claims, "exp").ok_or_else(|| {
            JwtError::new(ErrorCode::PolicyViolation, "exp claim is required by policy")
        })?;
        if now > exp.saturating_add(policy.leeway_seconds) {
            return Err(JwtError::new(ErrorCode::Expired, "Token has expired"));
        }
    }

    if policy.require_nbf {
        let nbf = get_int(claims, "nbf").ok_or_else(|| {
            JwtError::new(ErrorCode::PolicyViolation, "nbf claim is required by policy")
        })?;
        if now.saturating_add(policy.leeway_seconds) < nbf {
            return Err(JwtError::new(ErrorCode::NotYetValid, "Token not valid yet"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::ClaimValue;

    const NOW: i64 = 1_700_000_000;

    fn claims(pairs: &[(&str, ClaimValue)]) -> ClaimMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn code(result: JwtResult<()>) -> ErrorCode {
        match result {
            Ok(()) => ErrorCode::Ok,
            Err(err) => err.code,
        }
    }

    #[test]
    fn test_defaults() {
        let policy = Policy::default();
        assert!(policy.require_exp);
        assert!(!policy.require_nbf);
        assert_eq!(policy.leeway_seconds, 0);
        assert!(policy.allows(JwtAlg::EdDSA));
        assert!(EngineOptions::default().thread_safe);
    }

    #[test]
    fn test_missing_exp_is_policy_violation() {
        assert_eq!(
            code(validate_policy(&Policy::default(), &ClaimMap::new(), NOW)),
            ErrorCode::PolicyViolation
        );
    }

    #[test]
    fn test_exp_boundaries() {
        let policy = Policy {
            leeway_seconds: 30,
            ..Policy::default()
        };
        let at = |exp: i64| claims(&[("exp", ClaimValue::Int(exp))]);

        assert_eq!(code(validate_policy(&policy, &at(NOW), NOW)), ErrorCode::Ok);
        assert_eq!(code(validate_policy(&policy, &at(NOW - 30), NOW)), ErrorCode::Ok);
        assert_eq!(code(validate_policy(&policy, &at(NOW - 31), NOW)), ErrorCode::Expired);
    }

    #[test]
    fn test_exp_as_exact_double() {
        let map = claims(&[("exp", ClaimValue::Double((NOW + 10) as f64))]);
        assert_eq!(code(validate_policy(&Policy::default(), &map, NOW)), ErrorCode::Ok);

        let map = claims(&[("exp", ClaimValue::Double(NOW as f64 + 0.5))]);
        assert_eq!(
            code(validate_policy(&Policy::default(), &map, NOW)),
            ErrorCode::PolicyViolation
        );
    }

    #[test]
    fn test_nbf_rules() {
        let policy = Policy {
            require_exp: false,
            require_nbf: true,
            leeway_seconds: 5,
            ..Policy::default()
        };
        let at = |nbf: i64| claims(&[("nbf", ClaimValue::Int(nbf))]);

        assert_eq!(
            code(validate_policy(&policy, &ClaimMap::new(), NOW)),
            ErrorCode::PolicyViolation
        );
        assert_eq!(code(validate_policy(&policy, &at(NOW + 5), NOW)), ErrorCode::Ok);
        assert_eq!(code(validate_policy(&policy, &at(NOW + 6), NOW)), ErrorCode::NotYetValid);
    }

    #[test]
    fn test_issuer_checked_before_time() {
        let policy = Policy {
            expected_iss: Some("auth".into()),
            ..Policy::default()
        };
        // Expired and wrong issuer: issuer wins.
        let map = claims(&[("iss", "other".into()), ("exp", ClaimValue::Int(0))]);
        assert_eq!(code(validate_policy(&policy, &map, NOW)), ErrorCode::InvalidIssuer);

        let map = claims(&[("exp", ClaimValue::Int(0))]);
        assert_eq!(code(validate_policy(&policy, &map, NOW)), ErrorCode::InvalidIssuer);
    }

    #[test]
    fn test_audience_must_be_text() {
        let policy = Policy {
            expected_aud: Some("api".into()),
            require_exp: false,
            ..Policy::default()
        };
        assert_eq!(
            code(validate_policy(&policy, &claims(&[("aud", ClaimValue::Int(1))]), NOW)),
            ErrorCode::InvalidAudience
        );
        assert_eq!(
            code(validate_policy(&policy, &claims(&[("aud", "api".into())]), NOW)),
            ErrorCode::Ok
        );
    }

    #[test]
    fn test_policy_from_toml() {
        let policy: Policy = toml::from_str(
            r#"
            allowed_algs = ["HS256", "EdDSA"]
            expected_iss = "issuer"
            leeway_seconds = 30
            "#,
        )
        .unwrap();
        assert_eq!(policy.allowed_algs, vec![JwtAlg::HS256, JwtAlg::EdDSA]);
        assert!(!policy.allows(JwtAlg::RS256));
        assert!(policy.require_exp);
        assert_eq!(policy.expected_aud, None);
    }
}
