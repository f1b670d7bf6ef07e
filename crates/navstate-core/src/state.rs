use std::collections::BTreeMap;
use std::mem;
use std::sync::Arc;

use crate::session::RequestBinding;
use crate::window::{Parameter, ParameterKey, PortletMode, WindowState};

/// An ordered value list. `None` entries are kept; a pending public
/// parameter whose first entry is `None` means "remove on commit".
pub type Values = Vec<Option<String>>;

pub type ParameterMap = BTreeMap<String, Values>;

/// The complete navigational state behind one portal URL.
///
/// All maps are ordered so that equal states always serialize to equal
/// bytes; the link-cache dedup and the shared-resource reverse table both
/// key on that.
///
/// `clone()` copies every map. The current public parameters are held behind
/// an `Arc` and only copied on the first write after a clone.
#[derive(Debug, Clone, Default)]
pub struct NavigationalState {
    pub(crate) render_path: Option<String>,
    pub(crate) action_window: Option<String>,
    pub(crate) resource_window: Option<String>,
    pub(crate) cacheability: Option<String>,
    pub(crate) resource_id: Option<String>,
    pub(crate) public_current: Arc<ParameterMap>,
    pub(crate) public_pending: ParameterMap,
    pub(crate) private_render: ParameterMap,
    pub(crate) window_states: BTreeMap<String, WindowState>,
    pub(crate) portlet_modes: BTreeMap<String, PortletMode>,
    pub(crate) parameters: BTreeMap<ParameterKey, Parameter>,
    pub(crate) binding: RequestBinding,
}

/// Equality over the persisted fields only; the request binding is ignored.
impl PartialEq for NavigationalState {
    fn eq(&self, other: &Self) -> bool {
        self.render_path == other.render_path
            && self.action_window == other.action_window
            && self.resource_window == other.resource_window
            && self.cacheability == other.cacheability
            && self.resource_id == other.resource_id
            && self.public_current == other.public_current
            && self.public_pending == other.public_pending
            && self.private_render == other.private_render
            && self.window_states == other.window_states
            && self.portlet_modes == other.portlet_modes
            && self.parameters == other.parameters
    }
}

impl Eq for NavigationalState {}

impl NavigationalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_path(&self) -> Option<&str> {
        self.render_path.as_deref()
    }

    pub fn set_render_path(&mut self, render_path: Option<String>) {
        self.render_path = render_path;
    }

    pub fn action_window(&self) -> Option<&str> {
        self.action_window.as_deref()
    }

    pub fn set_action_window(&mut self, window_id: Option<String>) {
        self.action_window = window_id;
    }

    pub fn resource_window(&self) -> Option<&str> {
        self.resource_window.as_deref()
    }

    pub fn set_resource_window(&mut self, window_id: Option<String>) {
        self.resource_window = window_id;
    }

    pub fn is_resource_request(&self) -> bool {
        self.resource_window.is_some()
    }

    pub fn cacheability(&self) -> Option<&str> {
        self.cacheability.as_deref()
    }

    pub fn set_cacheability(&mut self, level: Option<String>) {
        self.cacheability = level;
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn set_resource_id(&mut self, resource_id: Option<String>) {
        self.resource_id = resource_id;
    }

    // Window state and mode -------------------------------------------------

    /// Never fails: an unknown window is [`WindowState::NORMAL`].
    pub fn window_state(&self, window_id: &str) -> WindowState {
        self.window_states
            .get(window_id)
            .cloned()
            .unwrap_or(WindowState::NORMAL)
    }

    pub fn set_window_state(&mut self, window_id: impl Into<String>, state: WindowState) {
        self.window_states.insert(window_id.into(), state);
    }

    pub fn window_states(&self) -> &BTreeMap<String, WindowState> {
        &self.window_states
    }

    /// Never fails: an unknown window is [`PortletMode::VIEW`].
    pub fn portlet_mode(&self, window_id: &str) -> PortletMode {
        self.portlet_modes
            .get(window_id)
            .cloned()
            .unwrap_or(PortletMode::VIEW)
    }

    pub fn set_portlet_mode(&mut self, window_id: impl Into<String>, mode: PortletMode) {
        self.portlet_modes.insert(window_id.into(), mode);
    }

    pub fn portlet_modes(&self) -> &BTreeMap<String, PortletMode> {
        &self.portlet_modes
    }

    // Window-scoped parameters ----------------------------------------------

    /// Adds `param`, replacing any parameter with the same window and name.
    pub fn add_parameter(&mut self, param: Parameter) {
        self.parameters.insert(param.key(), param);
    }

    pub fn parameter(&self, window_id: &str, name: &str) -> Option<&Parameter> {
        self.parameters.get(&ParameterKey::new(window_id, name))
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn parameters_for<'a>(&'a self, window_id: &'a str) -> impl Iterator<Item = &'a Parameter> + 'a {
        self.parameters
            .values()
            .filter(move |p| p.window_id == window_id)
    }

    pub fn clear_parameters(&mut self, window_id: &str) {
        self.parameters.retain(|key, _| key.window_id != window_id);
    }

    // Public and private render parameters ----------------------------------

    pub fn public_parameters_current(&self) -> &ParameterMap {
        &self.public_current
    }

    pub fn add_public_parameter_current(&mut self, name: impl Into<String>, values: Values) {
        Arc::make_mut(&mut self.public_current).insert(name.into(), values);
    }

    /// Puts `value` in front of the current values of `name`, creating the
    /// entry if needed.
    pub fn add_public_parameter_action_resource(&mut self, name: &str, value: impl Into<String>) {
        let current = Arc::make_mut(&mut self.public_current);
        let values = current.entry(name.to_string()).or_default();
        values.insert(0, Some(value.into()));
    }

    /// Stages updates to be committed by [`NavigationalState::merge`].
    pub fn add_pending_public_parameters(&mut self, updates: ParameterMap) {
        self.public_pending.extend(updates);
    }

    pub fn pending_public_parameters(&self) -> &ParameterMap {
        &self.public_pending
    }

    /// The public parameters as seen by a window: current values not
    /// overridden by a staged update, plus staged updates that set a value.
    pub fn public_parameters(&self) -> ParameterMap {
        let mut effective: ParameterMap = self
            .public_current
            .iter()
            .filter(|(name, _)| !self.public_pending.contains_key(*name))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();
        for (name, values) in &self.public_pending {
            if !is_removal(values) {
                effective.insert(name.clone(), values.clone());
            }
        }
        effective
    }

    pub fn private_render_parameters(&self) -> &ParameterMap {
        &self.private_render
    }

    pub fn private_render_parameters_mut(&mut self) -> &mut ParameterMap {
        &mut self.private_render
    }

    // Request binding --------------------------------------------------------

    pub fn binding(&self) -> &RequestBinding {
        &self.binding
    }

    pub fn bind(&mut self, binding: RequestBinding) {
        self.binding = binding;
    }

    pub fn binding_mut(&mut self) -> &mut RequestBinding {
        &mut self.binding
    }

    pub fn url_base(&self) -> &str {
        &self.binding.url_base
    }

    pub fn set_url_base(&mut self, url_base: impl Into<String>) {
        self.binding.url_base = url_base.into();
    }

    pub fn origin_id(&self) -> &str {
        &self.binding.origin_id
    }

    /// Renders this state through the parser that produced it.
    pub fn to_url(&self) -> Option<String> {
        self.binding.renderer().map(|renderer| renderer.render(self))
    }

    // Transformations ---------------------------------------------------------

    /// Folds the outcome of a request against `window_id` into this state.
    ///
    /// Takes the target windows, cacheability and resource id from `other`,
    /// the mode, state and parameters of `window_id`, and commits `other`'s
    /// staged public parameters into the current ones.
    pub fn merge(&mut self, other: &NavigationalState, window_id: &str) {
        self.action_window = other.action_window.clone();
        self.resource_window = other.resource_window.clone();
        self.set_portlet_mode(window_id, other.portlet_mode(window_id));
        self.set_window_state(window_id, other.window_state(window_id));
        self.cacheability = other.cacheability.clone();
        self.resource_id = other.resource_id.clone();

        self.clear_parameters(window_id);
        for param in other.parameters_for(window_id) {
            self.add_parameter(param.clone());
        }

        if other.public_pending.is_empty() {
            return;
        }
        let current = Arc::make_mut(&mut self.public_current);
        for (name, values) in &other.public_pending {
            if is_removal(values) {
                current.remove(name);
            } else {
                current.insert(name.clone(), values.clone());
            }
        }
    }

    /// Rewrites this state into its session-independent shared form.
    ///
    /// Everything except the resource window's own parameters is dropped;
    /// those move to the window `shared_id`, which also becomes the resource
    /// window. The URL base becomes `<context path>/<shared_id>`.
    pub fn convert_to_shared_resource(&mut self, shared_id: &str) {
        self.binding.url_base = format!("{}/{}", self.binding.context_path, shared_id);
        self.render_path = None;
        self.action_window = None;
        self.cacheability = None;
        self.resource_id = None;
        self.public_current = Arc::default();
        self.public_pending.clear();
        self.private_render.clear();
        self.window_states.clear();
        self.portlet_modes.clear();

        let resource_window = self.resource_window.take();
        for param in mem::take(&mut self.parameters).into_values() {
            if resource_window.as_deref() == Some(param.window_id.as_str()) {
                self.add_parameter(Parameter {
                    window_id: shared_id.to_string(),
                    ..param
                });
            }
        }
        self.resource_window = Some(shared_id.to_string());
    }
}

/// A staged value list removes its key when its first entry is absent.
/// An empty list carries no value either and is treated the same way.
fn is_removal(values: &Values) -> bool {
    !matches!(values.first(), Some(Some(_)))
}
