//! Transport-neutral request and response
//!
//! The transport layer converts its own types into [`WebRequest`] and turns
//! the [`WebResponse`] sink back into a wire response.

/// Ordered multi-map of request parameters
///
/// Names keep the order of their first occurrence; repeated names collect
/// their values in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, Vec<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string (query or body)
    pub fn from_urlencoded(input: &str) -> Self {
        let mut params = Self::new();
        params.extend_urlencoded(input);
        params
    }

    pub fn extend_urlencoded(&mut self, input: &str) {
        for (name, value) in url::form_urlencoded::parse(input.as_bytes()) {
            self.append(name.into_owned(), value.into_owned());
        }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some((_, values)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            values.push(value);
        } else {
            self.entries.push((name, vec![value]));
        }
    }

    /// All values of `name`
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Values of `name` joined with `,`
    pub fn joined(&self, name: &str) -> Option<String> {
        self.get(name).map(|values| values.join(","))
    }

    /// Last parameter in request order
    pub fn last(&self) -> Option<(&str, &[String])> {
        self.entries
            .last()
            .map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incoming request as seen by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebRequest {
    method: String,
    path: String,
    query: Option<String>,
    params: Params,
}

impl WebRequest {
    /// Build from a method and a request target (`/path?query`)
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        Self {
            method: method.into(),
            path: path.to_string(),
            query: query.map(ToString::to_string),
            params: query.map(Params::from_urlencoded).unwrap_or_default(),
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new("GET", target)
    }

    /// Merge an urlencoded form body into the parameters
    #[must_use]
    pub fn with_form(mut self, body: &str) -> Self {
        self.params.extend_urlencoded(body);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw request path, before context stripping and normalization
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }
}

/// Response sink written by the dispatcher and by operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResponse {
    status: u16,
    content_type: String,
    body: String,
}

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

impl Default for WebResponse {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: String::new(),
        }
    }
}

impl WebResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text to the body
    pub fn write(&mut self, text: &str) {
        self.body.push_str(text);
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Drop anything written so far and return to the defaults
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}
