use std::collections::BTreeMap;

use axum::http::request::Parts;
use serde::Serialize;

/// Request metadata normalized by an adapter, handed to context projections.
///
/// The dispatcher carries this value through one call without reading it;
/// only projections registered via [`context`](crate::registry::context)
/// interpret its fields. Adapters fill in whatever their host framework
/// exposes and leave the rest at the defaults.
#[derive(Clone, Debug, Serialize)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub host: Option<String>,
    pub raw_url: Option<String>,
    /// Header map with lowercased names. Cookies, if any, arrive here under
    /// the `cookie` key exactly as the host delivered them.
    pub headers: BTreeMap<String, String>,
    /// Query pairs split on `&`/`=`, not percent-decoded. Adapters only do
    /// shape conversion; decoding beyond that is the caller's business.
    pub query: BTreeMap<String, String>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            method: "POST".to_owned(),
            path: "/".to_owned(),
            host: None,
            raw_url: None,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
        }
    }
}

impl RequestContext {
    /// Builds a context from `http` request parts.
    ///
    /// Shared by the shipped adapters; custom adapters over `http`-shaped
    /// hosts can reuse it as well. Header values that are not valid UTF-8
    /// are skipped.
    pub fn from_parts(parts: &Parts) -> Self {
        let mut headers = BTreeMap::new();
        for (name, value) in &parts.headers {
            if let Ok(text) = value.to_str() {
                headers.insert(name.as_str().to_ascii_lowercase(), text.to_owned());
            }
        }

        let host = headers.get("host").cloned();
        let path = parts.uri.path().to_owned();
        let raw_url = Some(parts.uri.to_string()).filter(|value| !value.is_empty());
        let query = parts.uri.query().map(parse_query).unwrap_or_default();

        Self {
            method: parts.method.to_string(),
            path,
            host,
            raw_url,
            headers,
            query,
        }
    }

    /// Looks up a header by its lowercased name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Looks up a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

fn parse_query(raw: &str) -> BTreeMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (pair.to_owned(), String::new()),
        })
        .collect()
}
