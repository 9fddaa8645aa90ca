use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{auth::claims::Claims, config::JwtConfig, error::AppError, state::AppState};

/// Signing and verification material derived from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    pub ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn issue(&self, user_id: i32, username: &str, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: username.to_owned(),
            id: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Issues a token with the configured lifetime.
    pub fn issue_default(&self, user_id: i32, username: &str) -> anyhow::Result<String> {
        self.issue(user_id, username, self.ttl)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            AppError::InvalidToken
        })?;
        debug!(user_id = data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 60,
        })
    }

    #[test]
    fn issue_and_verify_token() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.issue(7, "alice", Duration::hours(1)).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn default_ttl_comes_from_config() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue_default(1, "bob").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(7, "alice", Duration::minutes(-5)).expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = make_keys("secret-a", "iss", "aud")
            .issue(7, "alice", Duration::hours(1))
            .expect("sign");
        let err = make_keys("secret-b", "iss", "aud").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let token = make_keys("same-secret", "good-iss", "good-aud")
            .issue(7, "alice", Duration::hours(1))
            .expect("sign");
        assert!(make_keys("same-secret", "bad-iss", "good-aud")
            .verify(&token)
            .is_err());
        assert!(make_keys("same-secret", "good-iss", "bad-aud")
            .verify(&token)
            .is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert!(matches!(
            keys.verify("not.a.jwt"),
            Err(AppError::InvalidToken)
        ));
    }
}
