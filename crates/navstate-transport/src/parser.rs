use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use bytes::Bytes;
use navstate_core::{
    CorrelationCaches, NavigationalState, ParserBuilder, ParserConfig, PortalError, RequestBinding,
    SharedResourceRegistry, UrlRenderer, NO_SESSION,
};
use navstate_crypto::TokenCipher;

use crate::query::{encode_component, QueryWriter};
use crate::request::InboundRequest;

/// Where the bytes of a parsed state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadSource {
    LinkCache,
    InlineToken,
    StateCache,
}

/// Turns inbound requests into navigational states and states back into
/// URLs.
///
/// Small states are sealed into the URL itself; larger ones are parked in
/// the link cache and referenced by key. Resource URLs of configured
/// libraries are rewritten into a session-independent shared form.
///
/// The parser is always handed out as an `Arc`: parsed states keep a weak
/// back-reference to it so they can render themselves.
pub struct PortalUrlParser {
    config: ParserConfig,
    caches: CorrelationCaches,
    registry: SharedResourceRegistry,
    cipher: Box<dyn TokenCipher>,
    closed: AtomicBool,
}

static_assertions::assert_impl_all!(PortalUrlParser: Send, Sync);

impl PortalUrlParser {
    pub fn new(
        config: ParserConfig,
        cipher: impl TokenCipher + 'static,
    ) -> Result<Arc<Self>, PortalError> {
        config.validate()?;
        let caches = CorrelationCaches::new(&config.caches);
        let registry = SharedResourceRegistry::new(&config.shared, config.caches.shared)?;
        tracing::info!(
            "PortalUrlParser: ready (inline limit {}/{}, shared resources {})",
            config.max_state_length,
            config.max_state_length_resource,
            if config.shared.enabled { "on" } else { "off" }
        );
        Ok(Arc::new(Self {
            config,
            caches,
            registry,
            cipher: Box::new(cipher),
            closed: AtomicBool::new(false),
        }))
    }

    pub fn from_builder(
        builder: ParserBuilder,
        cipher: impl TokenCipher + 'static,
    ) -> Result<Arc<Self>, PortalError> {
        Self::new(builder.config, cipher)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn caches(&self) -> &CorrelationCaches {
        &self.caches
    }

    pub fn registry(&self) -> &SharedResourceRegistry {
        &self.registry
    }

    /// Replaces the shared-library patterns without blocking builds in
    /// flight.
    pub fn swap_library_patterns<I, S>(&self, patterns: I) -> Result<(), PortalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.swap_patterns(patterns)?;
        Ok(())
    }

    /// Drops every cached payload and shared mapping. Calling it again is a
    /// no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.caches.clear();
        self.registry.clear();
        tracing::info!("PortalUrlParser: closed, caches released");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn renderer(self: &Arc<Self>) -> Weak<dyn UrlRenderer> {
        let weak: Weak<Self> = Arc::downgrade(self);
        weak
    }

    /// Resolves the state behind `request`.
    ///
    /// Unreadable tokens and undecodable payloads yield a fresh empty state.
    /// The only error is [`PortalError::ReverseMap`]: a shared token whose
    /// owning state is unknown.
    pub fn parse(self: &Arc<Self>, request: &InboundRequest) -> Result<NavigationalState, PortalError> {
        let origin = request.origin();
        // Only identified sessions own a state cache entry.
        let session = request.origin_id.as_deref();
        let token = request
            .shared_token(self.registry.segment())
            .or_else(|| request.token.clone())
            .filter(|token| !token.is_empty());

        let mut state = match self.resolve_payload(token.as_deref(), session) {
            Some((payload, source)) => match NavigationalState::decode(&payload) {
                Ok(state) => {
                    if let Some(session) = session.filter(|_| {
                        token.is_some()
                            && state.action_window().is_none()
                            && state.resource_window().is_none()
                    }) {
                        self.caches.remember_state(session, payload);
                    }
                    state
                }
                Err(err) => {
                    tracing::warn!("{}: Discarding undecodable {:?} payload: {}", origin, source, err);
                    if let (PayloadSource::StateCache, Some(session)) = (source, session) {
                        self.caches.forget_state(session);
                    }
                    NavigationalState::new()
                }
            },
            None => NavigationalState::new(),
        };

        state.bind(
            RequestBinding::new(
                request.url_base(),
                request.servlet_and_path_info(),
                request.context_path.as_str(),
                origin,
            )
            .with_renderer(self.renderer()),
        );

        if state.resource_window() == Some(self.registry.segment()) {
            let mut owner = self.registry.resolve(&state).inspect_err(|err| {
                tracing::warn!("{}: {}", origin, err);
            })?;
            let binding = owner.binding_mut();
            binding.origin_id = origin.to_string();
            binding.set_renderer(self.renderer());
            tracing::debug!("{}: Resolved shared resource to its owning state", origin);
            state = owner;
        }

        if let Some(action_window) = state.action_window().map(str::to_owned) {
            state.clear_parameters(&action_window);
        }
        Ok(state)
    }

    fn resolve_payload(
        &self,
        token: Option<&str>,
        session: Option<&str>,
    ) -> Option<(Bytes, PayloadSource)> {
        let origin = session.unwrap_or(NO_SESSION);
        let Some(token) = token else {
            let session = session.filter(|_| self.config.state_cache_enabled)?;
            let payload = self.caches.resume_state(session);
            tracing::debug!(
                "{}: State cache {}",
                origin,
                if payload.is_some() { "hit" } else { "miss" }
            );
            return payload.map(|payload| (payload, PayloadSource::StateCache));
        };

        if let Some(payload) = self.caches.resolve_link(token) {
            tracing::debug!("{}: Fetched state from link cache: {} bytes", origin, payload.len());
            return Some((payload, PayloadSource::LinkCache));
        }
        match self.cipher.decrypt(token) {
            Ok(plain) => Some((Bytes::from(plain), PayloadSource::InlineToken)),
            Err(err) => {
                tracing::debug!("{}: Token is neither a link key nor a sealed state: {}", origin, err);
                None
            }
        }
    }

    /// Renders `state` as a URL.
    ///
    /// Never fails: if no token can be produced the plain URL base is
    /// returned, still followed by the action and resource window parameters.
    pub fn build(&self, state: &NavigationalState) -> String {
        let origin = state.origin_id();
        let shared = self
            .registry
            .qualifies(state)
            .then(|| self.registry.share(state));

        let mut url = String::with_capacity(128);
        let emitted = match &shared {
            // Shared forms always take a link key: a sealed token carries a
            // random nonce and would differ per build.
            Some(form) => {
                let link = self.caches.store_link(form.encoded.clone());
                tracing::debug!("{}: Shared resource under link key {}", origin, link.key);
                url.push_str(form.state.url_base());
                url.push('/');
                url.push_str(&link.key);
                &form.state
            }
            None => {
                url.push_str(state.url_base());
                match self.tokenize(Bytes::from(state.encode()), state.is_resource_request()) {
                    Ok(token) => QueryWriter::new(&mut url).push_encoded(&self.config.token_param, &token),
                    Err(err) => tracing::warn!("{}: Building URL token failed: {}", origin, err),
                }
                state
            }
        };

        let mut query = QueryWriter::new(&mut url);
        let mut previous = None;
        for window in [emitted.action_window(), emitted.resource_window()].into_iter().flatten() {
            if previous == Some(window) {
                continue;
            }
            previous = Some(window);
            for param in emitted.parameters_for(window) {
                for value in &param.values {
                    query.push(&param.name, value);
                }
            }
        }
        url
    }

    /// Inlines `payload` as a sealed token when it fits the threshold,
    /// otherwise parks it in the link cache and returns the key.
    fn tokenize(&self, payload: Bytes, resource_request: bool) -> Result<String, PortalError> {
        let limit = self.config.max_inline_length(resource_request);
        if payload.len() > limit {
            let link = self.caches.store_link(payload);
            tracing::debug!(
                "PortalUrlParser: {} link key {}",
                if link.reused { "Reused" } else { "Issued" },
                link.key
            );
            return Ok(link.key);
        }
        let sealed = self.cipher.encrypt(&payload)?;
        Ok(encode_component(&sealed))
    }
}

impl UrlRenderer for PortalUrlParser {
    fn render(&self, state: &NavigationalState) -> String {
        self.build(state)
    }
}
