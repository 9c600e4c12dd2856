use std::fmt;

use crate::AuthError;

const APP_ID_PARAM: &str = "app_id";
const TOKEN_PARAM: &str = "token";
const TIMESTAMP_PARAM: &str = "ts";

/// Descriptor of a single authentication attempt, derived from the request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    url: String,
    base_url: String,
    app_id: Option<String>,
    token: Option<String>,
    timestamp: Option<i64>,
}

impl ApiRequest {
    /// Build a descriptor from any string. Never fails; parts that cannot be
    /// found in the query string are left empty.
    pub fn from_url(url: &str) -> Self {
        let (base_url, query) = match url.split_once('?') {
            Some((base, query)) => (base, query),
            None => (url, ""),
        };

        let mut request = Self {
            url: url.to_string(),
            base_url: base_url.to_string(),
            app_id: None,
            token: None,
            timestamp: None,
        };

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                APP_ID_PARAM => request.app_id = Some(value.to_string()),
                TOKEN_PARAM => request.token = Some(value.to_string()),
                TIMESTAMP_PARAM => request.timestamp = value.parse().ok(),
                _ => {}
            }
        }

        request
    }

    /// Build a descriptor and require every part a credential check needs.
    pub fn parse(url: &str) -> Result<Self, AuthError> {
        let request = Self::from_url(url);
        if request.base_url.is_empty() {
            return Err(AuthError::InvalidUrl(format!("{url:?} has no base url")));
        }
        if request.app_id.as_deref().map_or(true, str::is_empty) {
            return Err(AuthError::InvalidUrl(format!("{url:?} has no {APP_ID_PARAM}")));
        }
        if request.token.as_deref().map_or(true, str::is_empty) {
            return Err(AuthError::InvalidUrl(format!("{url:?} has no {TOKEN_PARAM}")));
        }
        if request.timestamp.is_none() {
            return Err(AuthError::InvalidUrl(format!(
                "{url:?} has no valid {TIMESTAMP_PARAM}"
            )));
        }
        Ok(request)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} {} {}}}",
            self.url,
            self.app_id.as_deref().unwrap_or(""),
            self.token.as_deref().unwrap_or(""),
            self.timestamp.unwrap_or_default(),
        )
    }
}
