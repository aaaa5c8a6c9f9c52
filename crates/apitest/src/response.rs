//! The response surface the harness asserts against.
//!
//! The HTTP client itself lives in the consuming application's test suite;
//! the harness only ever sees this decoded form.

/// A response captured from the application under test.
#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TestResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header with the given name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Whether the Content-Type contains `fragment`, so that
    /// `application/json; charset=utf-8` still counts as JSON.
    pub fn has_content_type(&self, fragment: &str) -> bool {
        self.content_type()
            .map(|ct| ct.contains(fragment))
            .unwrap_or(false)
    }

    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::media_types;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = TestResponse::new(200, "{}")
            .with_header("content-type", "application/json; charset=utf-8");
        assert_eq!(
            response.content_type(),
            Some("application/json; charset=utf-8")
        );
        assert!(response.has_content_type(media_types::JSON));
    }

    #[test]
    fn test_missing_content_type() {
        let response = TestResponse::new(204, "");
        assert_eq!(response.content_type(), None);
        assert!(!response.has_content_type(media_types::JSON));
    }

    #[test]
    fn test_is_successful() {
        assert!(TestResponse::new(201, "").is_successful());
        assert!(!TestResponse::new(404, "").is_successful());
        assert!(!TestResponse::new(500, "").is_successful());
    }
}
