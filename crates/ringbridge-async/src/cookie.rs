use std::fmt::Write as _;

/// A host-side HTTP cookie.
///
/// Inbound cookies only carry a name and value on the wire; the remaining
/// attributes keep their defaults. Outbound cookies render to a
/// `Set-Cookie` header value with [`Cookie::to_set_cookie()`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    /// Lifetime in seconds; `None` makes a session cookie.
    pub max_age: Option<i64>,
    pub version: u8,
    pub discard: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Parse a request `Cookie` header value (`a=1; b=2`).
    ///
    /// Pairs without `=` or with an empty name are skipped. Surrounding
    /// double quotes on a value are removed.
    pub fn parse_header(header: &str) -> Vec<Cookie> {
        header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                Some(Cookie::new(name, value))
            })
            .collect()
    }

    /// Render the cookie as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);

        if let Some(domain) = &self.domain {
            let _ = write!(out, "; Domain={domain}");
        }
        if let Some(path) = &self.path {
            let _ = write!(out, "; Path={path}");
        }
        if let Some(max_age) = self.max_age {
            let _ = write!(out, "; Max-Age={max_age}");
        }
        if self.version > 0 {
            let _ = write!(out, "; Version={}", self.version);
        }
        if self.secure {
            out.push_str("; Secure");
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.discard {
            out.push_str("; Discard");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_basic() {
        let cookie = Cookie::new("session_id", "abc123");
        assert_eq!(cookie.name, "session_id");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.path, None);
        assert!(!cookie.secure);
        assert!(!cookie.discard);
        assert_eq!(cookie.version, 0);
    }

    #[test]
    fn parse_header_pairs() {
        let cookies = Cookie::parse_header("a=1; b = two ;c=\"quoted\"; junk; =x");
        let pairs: Vec<(&str, &str)> = cookies
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "two"), ("c", "quoted")]);
    }

    #[test]
    fn set_cookie_minimal() {
        assert_eq!(Cookie::new("id", "7").to_set_cookie(), "id=7");
    }

    #[test]
    fn set_cookie_all_attributes() {
        let cookie = Cookie {
            name: "sid".into(),
            value: "xyz".into(),
            domain: Some("example.com".into()),
            path: Some("/".into()),
            secure: true,
            http_only: true,
            max_age: Some(3600),
            version: 1,
            discard: true,
        };
        assert_eq!(
            cookie.to_set_cookie(),
            "sid=xyz; Domain=example.com; Path=/; Max-Age=3600; Version=1; Secure; HttpOnly; Discard"
        );
    }
}
