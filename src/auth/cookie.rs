// Session cookie helpers: building Set-Cookie values and reading the Cookie header

use axum::http::{header, HeaderMap, HeaderValue};

use crate::auth::error::AuthError;
use crate::config::{SessionConfig, SESSION_TTL_SECS};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "access_token";

/// HttpOnly cookie carrying `token`, expiring together with the token
pub fn session_cookie(token: &str, session: &SessionConfig) -> Result<HeaderValue, AuthError> {
    let secure = if session.secure_cookie { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE, token, SESSION_TTL_SECS, secure
    ))
    .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Expired, empty cookie that makes the browser drop the session
pub fn clear_session_cookie(session: &SessionConfig) -> HeaderValue {
    let value = if session.secure_cookie {
        "access_token=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax; Secure"
    } else {
        "access_token=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax"
    };
    HeaderValue::from_static(value)
}

/// Value of cookie `name` from the request's Cookie header(s), if non-empty
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether a response already sets the session cookie
pub fn sets_session_cookie(headers: &HeaderMap) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(raw: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(raw).unwrap());
        headers
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc.def.ghi", &SessionConfig::default()).unwrap();
        let text = cookie.to_str().unwrap();

        assert!(text.starts_with("access_token=abc.def.ghi;"));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("Max-Age=604800"));
        assert!(text.contains("Path=/"));
        assert!(!text.contains("Secure"));
    }

    #[test]
    fn test_secure_flag_follows_config() {
        let session = SessionConfig {
            secure_cookie: true,
            ..SessionConfig::default()
        };

        assert!(session_cookie("t", &session).unwrap().to_str().unwrap().ends_with("; Secure"));
        assert!(clear_session_cookie(&session).to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie(&SessionConfig::default());
        let text = cookie.to_str().unwrap();

        assert!(text.starts_with("access_token=;"));
        assert!(text.contains("Max-Age=0"));
        assert!(text.contains("HttpOnly"));
    }

    #[test]
    fn test_read_cookie() {
        let headers = headers_with_cookie("theme=dark; access_token=tok.en.value; lang=ko");
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("tok.en.value".to_string()));
        assert_eq!(read_cookie(&headers, "lang"), Some("ko".to_string()));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_ignores_empty_and_absent() {
        assert_eq!(read_cookie(&HeaderMap::new(), SESSION_COOKIE), None);
        assert_eq!(read_cookie(&headers_with_cookie("access_token="), SESSION_COOKIE), None);
        // prefix of another cookie's name must not match
        assert_eq!(read_cookie(&headers_with_cookie("xaccess_token=v"), SESSION_COOKIE), None);
    }

    #[test]
    fn test_sets_session_cookie() {
        let mut headers = HeaderMap::new();
        assert!(!sets_session_cookie(&headers));

        headers.append(header::SET_COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(!sets_session_cookie(&headers));

        headers.append(header::SET_COOKIE, clear_session_cookie(&SessionConfig::default()));
        assert!(sets_session_cookie(&headers));
    }
}
