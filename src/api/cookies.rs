//! Netscape cookie jar files as exported by browser extensions

use std::path::Path;

use super::{ApiError, Result};

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub domain: String,
    /// Unix seconds; 0 marks a session cookie
    pub expires: i64,
    pub name: String,
    pub value: String,
}

pub fn parse_netscape(contents: &str) -> Result<Vec<Cookie>> {
    let mut cookies = Vec::new();

    for (index, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        // curl and most exporters mark HttpOnly cookies with a comment-like prefix
        let line = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => rest,
            None if line.starts_with('#') => continue,
            None => line,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            return Err(ApiError::Cookies(format!(
                "line {}: expected 7 tab-separated fields, found {}",
                index + 1,
                fields.len()
            )));
        }

        // an empty expiry marks a session cookie
        let expires = match fields[4] {
            "" => 0,
            raw => raw.parse::<i64>().map_err(|_| {
                ApiError::Cookies(format!("line {}: invalid expiry '{}'", index + 1, raw))
            })?,
        };

        cookies.push(Cookie {
            domain: fields[0].to_string(),
            expires,
            name: fields[5].to_string(),
            value: fields[6].to_string(),
        });
    }

    Ok(cookies)
}

pub async fn load(path: &Path) -> Result<Vec<Cookie>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ApiError::Cookies(format!("{}: {}", path.display(), e)))?;
    parse_netscape(&contents)
}

/// The Apple Music session cookie, skipping expired copies
pub fn media_user_token(cookies: &[Cookie]) -> Option<&str> {
    let now = chrono::Utc::now().timestamp();
    cookies
        .iter()
        .find(|c| {
            c.name == "media-user-token"
                && c.domain.ends_with("apple.com")
                && !c.value.is_empty()
                && (c.expires == 0 || c.expires > now)
        })
        .map(|c| c.value.as_str())
}
