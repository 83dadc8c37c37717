use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session";

/// Ten years. Longer lifetimes overflow chrono's date arithmetic.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Identity of the logged-in user for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    exp: usize,
    iat: usize,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
        }
    }

    /// Random alphanumeric secret for when none is configured.
    pub fn generate_secret() -> String {
        use rand::Rng;
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        const SECRET_LENGTH: usize = 64;

        let mut rng = rand::thread_rng();
        (0..SECRET_LENGTH)
            .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    }

    fn issue(&self, user_id: Uuid, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: (now + self.ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    fn verify(&self, token: &str) -> Option<Session> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                debug!("rejecting session cookie: {}", e);
                return None;
            }
        };

        let user_id = Uuid::parse_str(&data.claims.sub).ok()?;
        Some(Session {
            user_id,
            username: data.claims.username,
        })
    }

    /// Establishes a session, replacing whatever the jar held before.
    pub fn start(
        &self,
        jar: CookieJar,
        user_id: Uuid,
        username: &str,
    ) -> Result<CookieJar, jsonwebtoken::errors::Error> {
        let token = self.issue(user_id, username)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);

        Ok(jar.add(cookie))
    }

    pub fn current(&self, jar: &CookieJar) -> Option<Session> {
        jar.get(SESSION_COOKIE).and_then(|c| self.verify(c.value()))
    }

    pub fn end(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jar_with(token: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(SESSION_COOKIE, token.to_string()))
    }

    #[test]
    fn test_start_then_current() {
        let sessions = SessionManager::new("secret", 24);
        let user_id = Uuid::new_v4();

        let jar = sessions.start(CookieJar::new(), user_id, "alice").unwrap();
        let session = sessions.current(&jar).unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.username, "alice");
    }

    #[test]
    fn test_start_replaces_previous_session() {
        let sessions = SessionManager::new("secret", 24);
        let bob = Uuid::new_v4();

        let jar = sessions.start(CookieJar::new(), Uuid::new_v4(), "alice").unwrap();
        let jar = sessions.start(jar, bob, "bob").unwrap();

        assert_eq!(sessions.current(&jar).unwrap().user_id, bob);
    }

    #[test]
    fn test_end_clears_session() {
        let sessions = SessionManager::new("secret", 24);
        let jar = sessions.start(CookieJar::new(), Uuid::new_v4(), "alice").unwrap();

        let jar = sessions.end(jar);
        assert!(sessions.current(&jar).is_none());
    }

    #[test]
    fn test_empty_jar_has_no_session() {
        let sessions = SessionManager::new("secret", 24);
        assert!(sessions.current(&CookieJar::new()).is_none());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let ours = SessionManager::new("secret", 24);
        let theirs = SessionManager::new("another-secret", 24);

        let token = theirs.issue(Uuid::new_v4(), "mallory").unwrap();
        assert!(ours.current(&jar_with(&token)).is_none());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let sessions = SessionManager::new("secret", 24);
        assert!(sessions.current(&jar_with("not-a-token")).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let sessions = SessionManager::new("secret", 24);
        let expired = SessionManager {
            ttl: Duration::hours(-1),
            ..sessions.clone()
        };

        let token = expired.issue(Uuid::new_v4(), "alice").unwrap();
        assert!(sessions.current(&jar_with(&token)).is_none());
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let sessions = SessionManager::new("secret", i64::MAX);
        assert_eq!(sessions.ttl, Duration::hours(MAX_SESSION_TTL_HOURS));

        let user_id = Uuid::new_v4();
        let jar = sessions.start(CookieJar::new(), user_id, "alice").unwrap();
        assert_eq!(sessions.current(&jar).unwrap().user_id, user_id);
    }

    #[test]
    fn test_generate_secret() {
        let s1 = SessionManager::generate_secret();
        let s2 = SessionManager::generate_secret();

        assert_eq!(s1.len(), 64);
        assert!(s1.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(s1, s2);
    }
}
