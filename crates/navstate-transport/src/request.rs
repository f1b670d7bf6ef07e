use navstate_core::NO_SESSION;

use crate::query::{decode_component, parse_query};

/// The parts of an inbound HTTP request the parser reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    pub context_path: String,
    pub servlet_path: String,
    pub path_info: Option<String>,
    /// Already percent-decoded.
    pub token: Option<String>,
    pub origin_id: Option<String>,
}

impl InboundRequest {
    pub fn new(context_path: impl Into<String>, servlet_path: impl Into<String>) -> Self {
        Self {
            context_path: context_path.into(),
            servlet_path: servlet_path.into(),
            ..Self::default()
        }
    }

    /// Splits a raw request URI such as `/ctx/portal?p=AB%2B` into paths and
    /// picks `token_param` out of its query. The context path is stripped
    /// when the URI starts with it; the rest becomes the servlet path.
    pub fn from_uri(context_path: &str, uri: &str, token_param: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };
        let servlet_path = path.strip_prefix(context_path).unwrap_or(path);
        let token = query.and_then(|query| {
            parse_query(query)
                .into_iter()
                .find(|(name, _)| name == token_param)
                .map(|(_, value)| value)
        });
        Self {
            context_path: context_path.to_string(),
            servlet_path: servlet_path.to_string(),
            path_info: None,
            token,
            origin_id: None,
        }
    }

    pub fn with_path_info(mut self, path_info: impl Into<String>) -> Self {
        self.path_info = Some(path_info.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_origin(mut self, origin_id: impl Into<String>) -> Self {
        self.origin_id = Some(origin_id.into());
        self
    }

    pub fn origin(&self) -> &str {
        self.origin_id.as_deref().unwrap_or(NO_SESSION)
    }

    /// Servlet path plus path info.
    pub fn servlet_and_path_info(&self) -> String {
        let mut path = self.servlet_path.clone();
        if let Some(info) = &self.path_info {
            path.push_str(info);
        }
        path
    }

    /// Context path, servlet path and path info.
    pub fn request_path(&self) -> String {
        format!("{}{}", self.context_path, self.servlet_and_path_info())
    }

    /// Base that outbound URLs for this request are built on.
    pub fn url_base(&self) -> String {
        self.request_path()
    }

    /// The token carried as a path segment under `<context>/<segment>/`,
    /// cut at the next `/` or `?`.
    pub fn shared_token(&self, segment: &str) -> Option<String> {
        let path = self.request_path();
        let prefix = format!("{}/{}/", self.context_path, segment);
        let rest = path.strip_prefix(&prefix)?;
        let end = rest.find(['/', '?']).unwrap_or(rest.len());
        let token = &rest[..end];
        (!token.is_empty()).then(|| decode_component(token))
    }
}
