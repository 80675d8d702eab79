//! Ordered header multimap
//!
//! Stores `(name, value)` pairs in insertion order. A name may appear any number
//! of times; nothing is deduplicated unless the caller asks for it through
//! [`Headers::set`]. Names are compared byte-for-byte (case-sensitive).

use hyper::body::Bytes;

/// Insertion-ordered multimap of header name to header value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(Bytes, Bytes)>,
}

impl Headers {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry, keeping any existing entries for `name`
    pub fn add(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Remove every entry for `name`, then append the new one
    pub fn set(&mut self, name: impl Into<Bytes>, value: impl Into<Bytes>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Remove every entry for `name`
    pub fn remove(&mut self, name: &[u8]) {
        self.entries.retain(|(n, _)| &n[..] != name);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, name: &[u8]) -> bool {
        self.entries.iter().any(|(n, _)| &n[..] == name)
    }

    /// True if an entry for `name` has exactly `value`
    pub fn contains_value(&self, name: &[u8], value: &[u8]) -> bool {
        self.get_all(name).any(|v| &v[..] == value)
    }

    /// First value stored for `name`
    pub fn get(&self, name: &[u8]) -> Option<&Bytes> {
        self.entries
            .iter()
            .find(|(n, _)| &n[..] == name)
            .map(|(_, v)| v)
    }

    /// All values for `name`, in the order they were added
    pub fn get_all<'a>(&'a self, name: &'a [u8]) -> impl Iterator<Item = &'a Bytes> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| &n[..] == name)
            .map(|(_, v)| v)
    }

    /// Every entry in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &Bytes)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for Headers
where
    N: Into<Bytes>,
    V: Into<Bytes>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(headers: &Headers, name: &[u8]) -> Vec<Vec<u8>> {
        headers.get_all(name).map(|v| v.to_vec()).collect()
    }

    #[test]
    fn test_add_keeps_duplicates_in_order() {
        let mut headers = Headers::new();
        headers.add("Set-Cookie", "a=1");
        headers.add("X-Other", "x");
        headers.add("Set-Cookie", "b=2");

        assert_eq!(values(&headers, b"Set-Cookie"), vec![b"a=1".to_vec(), b"b=2".to_vec()]);
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut headers = Headers::new();
        headers.add("X-Count", "1");
        headers.add("X-Count", "2");
        headers.set("X-Count", "3");

        assert_eq!(values(&headers, b"X-Count"), vec![b"3".to_vec()]);
    }

    #[test]
    fn test_set_moves_entry_to_end() {
        let mut headers = Headers::new();
        headers.add("A", "1");
        headers.add("B", "2");
        headers.set("A", "3");

        let order: Vec<_> = headers.iter().map(|(n, _)| n.to_vec()).collect();
        assert_eq!(order, vec![b"B".to_vec(), b"A".to_vec()]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain");

        assert!(headers.contains(b"Content-Type"));
        assert!(!headers.contains(b"content-type"));
    }

    #[test]
    fn test_contains_value() {
        let mut headers = Headers::new();
        headers.add("Vary", "Accept");
        headers.add("Vary", "Origin");

        assert!(headers.contains_value(b"Vary", b"Origin"));
        assert!(!headers.contains_value(b"Vary", b"Cookie"));
        assert!(!headers.contains_value(b"Missing", b"Origin"));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut headers: Headers = vec![("A", "1"), ("B", "2"), ("A", "3")].into_iter().collect();
        headers.remove(b"A");
        assert!(!headers.contains(b"A"));
        assert_eq!(headers.len(), 1);

        headers.clear();
        assert!(headers.is_empty());
        assert_eq!(headers.get(b"B"), None);
    }

    #[test]
    fn test_get_returns_first_value() {
        let mut headers = Headers::new();
        headers.add("Accept", "text/html");
        headers.add("Accept", "application/json");

        // The lookup name may be a short-lived buffer
        let name = String::from("Accept");
        let first = headers.get(name.as_bytes());
        drop(name);

        assert_eq!(first.map(|v| &v[..]), Some(&b"text/html"[..]));
        assert_eq!(headers.get(b"accept"), None);
    }
}
