use std::sync::{Arc, Weak};

use crate::state::NavigationalState;

/// Origin id used when the request has no session.
pub const NO_SESSION: &str = "noSession";

/// Turns a state back into a URL. Implemented by the parser that produced it.
pub trait UrlRenderer: Send + Sync {
    fn render(&self, state: &NavigationalState) -> String;
}

/// Per-request context attached to a decoded state. Never serialized.
///
/// The renderer is held weakly: the parser's shared-resource table keeps
/// states alive, and those states point back at the parser.
#[derive(Debug, Clone)]
pub struct RequestBinding {
    pub url_base: String,
    pub servlet_path: String,
    pub context_path: String,
    pub origin_id: String,
    renderer: Option<Weak<dyn UrlRenderer>>,
}

impl Default for RequestBinding {
    fn default() -> Self {
        Self {
            url_base: String::new(),
            servlet_path: String::new(),
            context_path: String::new(),
            origin_id: NO_SESSION.to_string(),
            renderer: None,
        }
    }
}

impl RequestBinding {
    pub fn new(
        url_base: impl Into<String>,
        servlet_path: impl Into<String>,
        context_path: impl Into<String>,
        origin_id: impl Into<String>,
    ) -> Self {
        Self {
            url_base: url_base.into(),
            servlet_path: servlet_path.into(),
            context_path: context_path.into(),
            origin_id: origin_id.into(),
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Weak<dyn UrlRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn set_renderer(&mut self, renderer: Weak<dyn UrlRenderer>) {
        self.renderer = Some(renderer);
    }

    /// The renderer, if one was attached and is still alive.
    pub fn renderer(&self) -> Option<Arc<dyn UrlRenderer>> {
        self.renderer.as_ref().and_then(Weak::upgrade)
    }
}
