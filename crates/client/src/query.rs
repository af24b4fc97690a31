//! Request-target assembly: endpoint + query string.
//!
//! Keys are emitted verbatim (`expand[]`, `arrival_date[gte]`), values are
//! percent-encoded. List values become repeated `key=item` pairs in order,
//! which is how Stripe expects `expand[]`.

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::Scalar(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::Scalar(v)
    }
}

impl From<&String> for ParamValue {
    fn from(v: &String) -> Self {
        Self::Scalar(v.clone())
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        Self::Scalar(v.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Scalar(v.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(v: &[&str]) -> Self {
        Self::List(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(v: [&str; N]) -> Self {
        Self::List(v.iter().map(|s| s.to_string()).collect())
    }
}

/// Insertion-ordered parameter mapping. Setting an existing key replaces
/// its value in place, so the emitted order stays stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, ParamValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(key, value)| {
            let items: Vec<&str> = match value {
                ParamValue::Scalar(v) => vec![v.as_str()],
                ParamValue::List(vs) => vs.iter().map(String::as_str).collect(),
            };
            items.into_iter().map(move |item| (key.as_str(), item))
        })
    }
}

/// `endpoint` alone when `params` is empty, otherwise `endpoint?k=v&k=v…`.
pub fn build_target(endpoint: &str, params: &QueryParams) -> String {
    let query: Vec<String> = params
        .pairs()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect();

    if query.is_empty() {
        endpoint.to_string()
    } else {
        format!("{}?{}", endpoint, query.join("&"))
    }
}
