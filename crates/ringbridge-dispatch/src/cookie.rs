//! Conversion between host cookies and plain attribute records.

use std::collections::BTreeMap;

use ringbridge_async::Cookie;
use serde::{Deserialize, Serialize};

/// Cookie attributes keyed by cookie name.
pub type Cookies = BTreeMap<String, CookieAttrs>;

/// Plain attribute record for one cookie.
///
/// Every field is optional so callers can state only what they care about;
/// unset fields fall back to the host cookie's defaults on write, except
/// `discard`, which is always written as `false` unless given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CookieAttrs {
    pub value: Option<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: Option<bool>,
    pub http_only: Option<bool>,
    pub max_age: Option<i64>,
    pub version: Option<u8>,
    pub discard: Option<bool>,
}

impl CookieAttrs {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Overlay `other` on `self`: fields set in `other` win.
    pub fn merge(mut self, other: &CookieAttrs) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(value, domain, path, secure, http_only, max_age, version, discard);
        self
    }
}

impl From<&Cookie> for CookieAttrs {
    fn from(cookie: &Cookie) -> Self {
        Self {
            value: Some(cookie.value.clone()),
            domain: cookie.domain.clone(),
            path: cookie.path.clone(),
            secure: Some(cookie.secure),
            http_only: Some(cookie.http_only),
            max_age: cookie.max_age,
            version: Some(cookie.version),
            discard: Some(cookie.discard),
        }
    }
}

/// Read host cookies into attribute records keyed by name. A later cookie
/// with the same name replaces an earlier one.
pub fn read_cookies<'a>(cookies: impl IntoIterator<Item = &'a Cookie>) -> Cookies {
    cookies
        .into_iter()
        .map(|c| (c.name.clone(), CookieAttrs::from(c)))
        .collect()
}

/// Build a host cookie named `name` from `attrs`.
pub fn write_cookie(name: &str, attrs: &CookieAttrs) -> Cookie {
    let mut cookie = Cookie::new(name, "");
    let attrs = CookieAttrs {
        discard: Some(false),
        ..Default::default()
    }
    .merge(attrs);

    if let Some(value) = attrs.value {
        cookie.value = value;
    }
    if let Some(path) = attrs.path {
        cookie.path = Some(path);
    }
    if let Some(domain) = attrs.domain {
        cookie.domain = Some(domain);
    }
    if let Some(secure) = attrs.secure {
        cookie.secure = secure;
    }
    if let Some(http_only) = attrs.http_only {
        cookie.http_only = http_only;
    }
    if let Some(max_age) = attrs.max_age {
        cookie.max_age = Some(max_age);
    }
    if let Some(discard) = attrs.discard {
        cookie.discard = discard;
    }
    if let Some(version) = attrs.version {
        cookie.version = version;
    }
    cookie
}
