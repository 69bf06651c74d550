use http::{HeaderName, HeaderValue};

use crate::Error;

/// An HTTP header as a name-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Check the pair against HTTP header grammar.
    pub fn validate(name: &str, value: &str) -> Result<(), Error> {
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// An ordered collection of HTTP headers.
///
/// Preserves insertion order and supports duplicate header names
/// (e.g., multiple `Set-Cookie` headers). Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<Header>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a value, keeping any existing values for the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// Replace every value stored under `name` (case-insensitive) with `values`.
    ///
    /// The replacement values take the position of the first removed entry,
    /// or go to the end when the name was absent.
    pub fn set<I, V>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let position = self
            .entries
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))
            .unwrap_or(self.entries.len());
        self.remove(name);
        let position = position.min(self.entries.len());
        let replacement: Vec<Header> = values
            .into_iter()
            .map(|v| Header::new(name, v))
            .collect();
        self.entries.splice(position..position, replacement);
    }

    /// Remove every value stored under `name` (case-insensitive).
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|h| !h.name.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    /// Get the first header value matching `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Get all header values matching `name` (case-insensitive).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Header> {
        self.entries
    }
}

impl FromIterator<Header> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| Header::new(n, v))
                .collect(),
        }
    }
}

impl IntoIterator for HeaderMap {
    type Item = Header;
    type IntoIter = std::vec::IntoIter<Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_insert_and_get() {
        let mut map = HeaderMap::new();
        map.insert("Content-Type", "text/html");
        assert_eq!(map.get("content-type"), Some("text/html"));
        assert_eq!(map.get("Content-Type"), Some("text/html"));
    }

    #[test]
    fn header_map_get_missing() {
        let map = HeaderMap::new();
        assert_eq!(map.get("X-Missing"), None);
        assert!(!map.contains("X-Missing"));
    }

    #[test]
    fn header_map_duplicate_headers() {
        let mut map = HeaderMap::new();
        map.insert("Set-Cookie", "a=1");
        map.insert("set-cookie", "b=2");

        assert_eq!(map.get("Set-Cookie"), Some("a=1"));
        assert_eq!(map.get_all("SET-COOKIE"), vec!["a=1", "b=2"]);
    }

    #[test]
    fn set_replaces_all_case_variants() {
        let mut map = HeaderMap::new();
        map.insert("Accept", "a");
        map.insert("X-Trace", "t");
        map.insert("accept", "b");

        map.set("ACCEPT", ["c", "d"]);

        assert_eq!(map.get_all("accept"), vec!["c", "d"]);
        assert_eq!(map.len(), 3);
        // Replacement keeps the slot of the first removed entry.
        let names: Vec<&str> = map.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["ACCEPT", "ACCEPT", "X-Trace"]);
    }

    #[test]
    fn set_on_absent_name_appends() {
        let mut map = HeaderMap::new();
        map.insert("A", "1");
        map.set("B", ["2"]);
        assert_eq!(map.get("b"), Some("2"));
        assert_eq!(map.iter().last().map(|h| h.name.as_str()), Some("B"));
    }

    #[test]
    fn remove_counts_entries() {
        let mut map = HeaderMap::new();
        map.insert("Vary", "a");
        map.insert("vary", "b");
        assert_eq!(map.remove("VARY"), 2);
        assert!(map.is_empty());
    }

    #[test]
    fn validate_rejects_bad_name_and_value() {
        assert!(Header::validate("x-ok", "fine").is_ok());
        assert!(matches!(
            Header::validate("bad name", "v"),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(matches!(
            Header::validate("x-bad", "line\nbreak"),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn header_map_from_iterator() {
        let map: HeaderMap = vec![
            ("Host".to_string(), "example.com".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("host"), Some("example.com"));
    }
}
