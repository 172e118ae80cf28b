use http::{HeaderName, HeaderValue};

/// An ordered list of header fields; a name may appear any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Appends a field; existing fields with the same name are kept.
    pub fn add(&mut self, name: HeaderName, value: HeaderValue) {
        self.entries.push((name, value));
    }

    /// Returns the last value of the named field.
    pub fn get<K: AsRef<str>>(&self, name: K) -> Option<&HeaderValue> {
        let name = HeaderName::from_bytes(name.as_ref().as_bytes()).ok()?;
        self.entries.iter().rev().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Returns every value of the named field, in order.
    pub fn values<K: AsRef<str>>(&self, name: K) -> Vec<&HeaderValue> {
        let Ok(name) = HeaderName::from_bytes(name.as_ref().as_bytes()) else {
            return Vec::new();
        };
        self.entries.iter().filter(|(n, _)| *n == name).map(|(_, v)| v).collect()
    }

    /// Distinct field names, in order of first appearance.
    pub fn names(&self) -> Vec<&HeaderName> {
        let mut names: Vec<&HeaderName> = Vec::new();
        for (name, _) in &self.entries {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for Headers {
    fn from_iter<T: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl IntoIterator for Headers {
    type Item = (HeaderName, HeaderValue);
    type IntoIter = std::vec::IntoIter<(HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Headers {
        [("x-tag", "one"), ("accept", "*/*"), ("x-tag", "two")]
            .into_iter()
            .map(|(n, v)| (HeaderName::from_static(n), HeaderValue::from_static(v)))
            .collect()
    }

    #[test]
    fn get_returns_last_value() {
        let headers = headers();
        assert_eq!(headers.get("X-Tag").unwrap(), "two");
        assert_eq!(headers.get(http::header::ACCEPT).unwrap(), "*/*");
        assert!(headers.get("missing").is_none());
    }

    #[test]
    fn values_and_names_keep_order() {
        let headers = headers();
        assert_eq!(headers.values("x-tag"), vec!["one", "two"]);
        assert_eq!(headers.names(), vec!["x-tag", "accept"]);
        assert_eq!(headers.len(), 3);
    }
}
