//! Token Service
//!
//! Issues and verifies the access/refresh token pair and moves it across the
//! cookie transport. Time-dependent operations have an `_at` variant that
//! takes an explicit `now`.

use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kernel::id::UserId;
use platform::cookie::{CookieConfig, extract_cookie};

use crate::application::config::TokenConfig;
use crate::domain::claims::Claims;
use crate::domain::token::{Strictness, TokenKind, TokenPair};
use crate::error::{AuthError, AuthResult};

/// Stateless JWT token service
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Build the service; fails if the secret is empty
    pub fn new(config: TokenConfig) -> AuthResult<Self> {
        if config.secret.is_empty() {
            return Err(AuthError::EmptySecret);
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked against the caller's clock in `extract_user_id_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    // ========================================================================
    // Issuance
    // ========================================================================

    pub fn issue_token_pair(&self, user_id: UserId) -> AuthResult<TokenPair> {
        self.issue_token_pair_at(user_id, Utc::now())
    }

    pub fn issue_token_pair_at(&self, user_id: UserId, now: DateTime<Utc>) -> AuthResult<TokenPair> {
        let access = self.sign(&Claims::new(user_id, now, self.config.access_ttl))?;
        let refresh = self.sign(&Claims::new(user_id, now, self.config.refresh_ttl))?;

        tracing::debug!(user_id = %user_id, "Issued token pair");

        Ok(TokenPair { access, refresh })
    }

    fn sign(&self, claims: &Claims) -> AuthResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    // ========================================================================
    // Extraction
    // ========================================================================

    /// Read and verify the `kind` token from the request cookies
    ///
    /// `Ok(None)` only for an absent or empty cookie in lenient mode.
    pub fn extract_user_id(
        &self,
        headers: &HeaderMap,
        strictness: Strictness,
        kind: TokenKind,
    ) -> AuthResult<Option<UserId>> {
        self.extract_user_id_at(headers, strictness, kind, Utc::now())
    }

    pub fn extract_user_id_at(
        &self,
        headers: &HeaderMap,
        strictness: Strictness,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<UserId>> {
        let token = extract_cookie(headers, self.cookie_name(kind)).filter(|t| !t.is_empty());

        let Some(token) = token else {
            return match strictness {
                Strictness::Strict => Err(AuthError::MissingToken(kind)),
                Strictness::Lenient => Ok(None),
            };
        };

        self.verify_at(&token, now).map(Some)
    }

    /// Verify a raw token and return its subject
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<UserId> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        if data.claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        data.claims.user_id()
    }

    // ========================================================================
    // Cookie transport
    // ========================================================================

    /// Append one `Set-Cookie` per token, scoped to `base_path`
    pub fn attach_tokens(
        &self,
        headers: &mut HeaderMap,
        pair: &TokenPair,
        base_path: &str,
    ) -> AuthResult<()> {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let value = self
                .cookie_config(kind, base_path)
                .header_value(pair.get(kind))
                .map_err(|e| AuthError::Internal(format!("Invalid cookie header: {e}")))?;
            headers.append(header::SET_COOKIE, value);
        }
        Ok(())
    }

    /// Append `Max-Age=0` cookies that remove both tokens
    pub fn clear_tokens(&self, headers: &mut HeaderMap, base_path: &str) -> AuthResult<()> {
        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let cookie = self.cookie_config(kind, base_path).build_delete_cookie();
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| AuthError::Internal(format!("Invalid cookie header: {e}")))?;
            headers.append(header::SET_COOKIE, value);
        }
        Ok(())
    }

    fn cookie_name(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.config.access_cookie_name,
            TokenKind::Refresh => &self.config.refresh_cookie_name,
        }
    }

    fn cookie_config(&self, kind: TokenKind, base_path: &str) -> CookieConfig {
        let path = if base_path.is_empty() { "/" } else { base_path };

        CookieConfig {
            name: self.cookie_name(kind).to_string(),
            domain: self.config.cookie_domain(),
            path: path.to_string(),
            secure: self.config.cookie_secure,
            http_only: true,
            same_site: self.config.cookie_same_site,
            max_age_secs: u64::try_from(self.config.cookie_max_age.num_seconds()).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const SECRET: &str = "test-secret-please-change";

    // {"typ":"JWT","alg":"RS256"}
    const RS256_HEADER: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOiJSUzI1NiJ9";

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new(SECRET)).unwrap()
    }

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn cookie_headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let cookie = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(&cookie).unwrap());
        headers
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenService::new(TokenConfig::default()),
            Err(AuthError::EmptySecret)
        ));
    }

    #[test]
    fn test_issue_then_extract_roundtrip() {
        let svc = service();
        for id in [1_i64, 42, i64::from(u32::MAX) + 5] {
            let pair = svc.issue_token_pair_at(UserId::new(id), epoch()).unwrap();
            let headers = cookie_headers(&[("session", &pair.access), ("refreshToken", &pair.refresh)]);

            let later = epoch() + Duration::hours(71);
            let access = svc
                .extract_user_id_at(&headers, Strictness::Strict, TokenKind::Access, later)
                .unwrap();
            let refresh = svc
                .extract_user_id_at(&headers, Strictness::Strict, TokenKind::Refresh, later)
                .unwrap();

            assert_eq!(access, Some(UserId::new(id)));
            assert_eq!(refresh, Some(UserId::new(id)));
        }
    }

    #[test]
    fn test_expired_token_rejected_in_both_modes() {
        let svc = service();
        let pair = svc.issue_token_pair_at(UserId::new(5), epoch()).unwrap();
        let headers = cookie_headers(&[("session", &pair.access)]);
        let after_expiry = epoch() + Duration::hours(72);

        for mode in [Strictness::Strict, Strictness::Lenient] {
            let result = svc.extract_user_id_at(&headers, mode, TokenKind::Access, after_expiry);
            assert!(matches!(result, Err(AuthError::Expired)));
        }
    }

    #[test]
    fn test_refresh_outlives_access() {
        let svc = service();
        let pair = svc.issue_token_pair_at(UserId::new(5), epoch()).unwrap();
        let headers = cookie_headers(&[("session", &pair.access), ("refreshToken", &pair.refresh)]);
        let now = epoch() + Duration::hours(100);

        assert!(
            svc.extract_user_id_at(&headers, Strictness::Strict, TokenKind::Access, now)
                .is_err()
        );
        assert_eq!(
            svc.extract_user_id_at(&headers, Strictness::Strict, TokenKind::Refresh, now)
                .unwrap(),
            Some(UserId::new(5))
        );
    }

    #[test]
    fn test_missing_cookie_lenient_is_anonymous() {
        let svc = service();
        let headers = HeaderMap::new();
        let result = svc.extract_user_id_at(&headers, Strictness::Lenient, TokenKind::Access, epoch());
        assert_eq!(result.unwrap(), None);

        let empty = cookie_headers(&[("session", "")]);
        let result = svc.extract_user_id_at(&empty, Strictness::Lenient, TokenKind::Access, epoch());
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_missing_cookie_strict_is_error() {
        let svc = service();
        let result =
            svc.extract_user_id_at(&HeaderMap::new(), Strictness::Strict, TokenKind::Refresh, epoch());
        assert!(matches!(result, Err(AuthError::MissingToken(TokenKind::Refresh))));

        let empty = cookie_headers(&[("refreshToken", "")]);
        let result = svc.extract_user_id_at(&empty, Strictness::Strict, TokenKind::Refresh, epoch());
        assert!(matches!(result, Err(AuthError::MissingToken(TokenKind::Refresh))));
    }

    #[test]
    fn test_foreign_algorithm_rejected() {
        let svc = service();
        let pair = svc.issue_token_pair_at(UserId::new(9), epoch()).unwrap();
        let (_, rest) = pair.access.split_once('.').unwrap();
        let forged = format!("{RS256_HEADER}.{rest}");

        let result = svc.verify_at(&forged, epoch());
        assert!(matches!(result, Err(AuthError::InvalidAlgorithm)));
    }

    #[test]
    fn test_other_secret_rejected() {
        let other = TokenService::new(TokenConfig::new("another-secret")).unwrap();
        let pair = other.issue_token_pair_at(UserId::new(9), epoch()).unwrap();

        let result = service().verify_at(&pair.access, epoch());
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let result = service().verify_at("not.a.jwt", epoch());
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn test_lenient_mode_still_rejects_bad_token() {
        let svc = service();
        let headers = cookie_headers(&[("session", "garbage")]);
        let result = svc.extract_user_id_at(&headers, Strictness::Lenient, TokenKind::Access, epoch());
        assert!(result.is_err());
    }

    #[test]
    fn test_attach_tokens_sets_two_cookies() {
        let svc = TokenService::new(TokenConfig::new(SECRET).with_cookie_domain("example.com")).unwrap();
        let pair = svc.issue_token_pair_at(UserId::new(3), epoch()).unwrap();

        let mut headers = HeaderMap::new();
        svc.attach_tokens(&mut headers, &pair, "/api").unwrap();

        let cookies: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with(&format!("session={}", pair.access)));
        assert!(cookies[1].starts_with(&format!("refreshToken={}", pair.refresh)));
        for cookie in cookies {
            assert!(cookie.contains("Path=/api"));
            assert!(cookie.contains("Domain=example.com"));
            assert!(cookie.contains("Max-Age=1728000"));
            assert!(cookie.contains("HttpOnly"));
            assert!(cookie.contains("Secure"));
            assert!(cookie.contains("SameSite=Strict"));
        }
    }

    #[test]
    fn test_empty_domain_is_omitted() {
        let svc = service();
        let pair = svc.issue_token_pair_at(UserId::new(3), epoch()).unwrap();
        let mut headers = HeaderMap::new();
        svc.attach_tokens(&mut headers, &pair, "/").unwrap();

        for value in headers.get_all(header::SET_COOKIE) {
            assert!(!value.to_str().unwrap().contains("Domain="));
        }
    }

    #[test]
    fn test_clear_tokens_expires_both_cookies() {
        let svc = service();
        let mut headers = HeaderMap::new();
        svc.clear_tokens(&mut headers, "/api").unwrap();

        let cookies: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
    }
}
