//! # Entity Tests: NavigationalState
//!
//! Validates the wire round-trip, merge semantics, public parameter staging
//! and the shared-resource conversion of the navigational state.

use navstate_codec::CodecError;
use navstate_core::{
    NavigationalState, Parameter, ParameterMap, PortletMode, RequestBinding, WindowState,
};
use std::time::Instant;

fn values(items: &[&str]) -> Vec<Option<String>> {
    items.iter().map(|s| Some(s.to_string())).collect()
}

fn page_state() -> NavigationalState {
    let mut state = NavigationalState::new();
    state.bind(RequestBinding::new("/cms/portal", "/portal", "/cms", "s1"));
    state.set_render_path(Some("/home".into()));
    state.set_window_state("news", WindowState::MAXIMIZED);
    state.set_portlet_mode("news", PortletMode::HELP);
    state.add_parameter(Parameter::new("news", "page", ["2"]));
    state.add_parameter(Parameter::new("weather", "city", ["Kigali", "Nairobi"]));
    state.add_public_parameter_current("lang", values(&["en"]));
    state
}

/// Verifies every persisted field survives encode/decode and transient
/// fields do not travel.
#[test]
fn test_state_round_trip() {
    let t = Instant::now();

    let mut state = page_state();
    state.set_action_window(Some("news".into()));
    state.set_resource_window(Some("weather".into()));
    state.set_cacheability(Some("page".into()));
    state.set_resource_id(Some("forecast".into()));
    let mut pending = ParameterMap::new();
    pending.insert("lang".into(), values(&["fr"]));
    pending.insert("theme".into(), vec![None]);
    state.add_pending_public_parameters(pending);
    state
        .private_render_parameters_mut()
        .insert("sort".into(), vec![Some("asc".into()), None]);

    let decoded = NavigationalState::decode(&state.encode()).unwrap();
    assert_eq!(decoded, state);
    assert_eq!(decoded.window_state("news"), WindowState::MAXIMIZED);
    assert_eq!(decoded.portlet_mode("news"), PortletMode::HELP);
    assert_eq!(decoded.url_base(), "");
    assert_eq!(decoded.origin_id(), "noSession");
    assert!(decoded.binding().renderer().is_none());

    let overhead = t.elapsed();
    println!("test_state_round_trip: Testing Overhead = {:?}", overhead);
}

/// Verifies truncated and foreign bytes decode to errors, never panics.
#[test]
fn test_decode_rejects_garbage() {
    let t = Instant::now();

    let bytes = page_state().encode();
    assert!(NavigationalState::decode(&bytes[..bytes.len() - 1]).is_err());
    assert!(NavigationalState::decode(b"").is_err());
    assert!(NavigationalState::decode(b"not a state").is_err());
    assert_eq!(
        NavigationalState::decode(&[0xc3, 0x28]),
        Err(CodecError::InvalidUtf8)
    );

    let overhead = t.elapsed();
    println!("test_decode_rejects_garbage: Testing Overhead = {:?}", overhead);
}

/// Verifies windows without an entry fall back to the defaults.
#[test]
fn test_window_defaults() {
    let t = Instant::now();

    let state = NavigationalState::new();
    assert_eq!(state.window_state("unknown"), WindowState::NORMAL);
    assert_eq!(state.portlet_mode("unknown"), PortletMode::VIEW);
    assert_eq!(WindowState::new("MAXIMIZED"), WindowState::MAXIMIZED);

    let overhead = t.elapsed();
    println!("test_window_defaults: Testing Overhead = {:?}", overhead);
}

/// Verifies merge copies the target window and commits staged public
/// parameters, removing those staged as absent.
#[test]
fn test_merge_commits_pending_public_parameters() {
    let t = Instant::now();

    let mut page = page_state();
    page.add_public_parameter_current("theme", values(&["dark"]));

    let mut outcome = NavigationalState::new();
    outcome.set_action_window(Some("news".into()));
    outcome.set_window_state("news", WindowState::MINIMIZED);
    outcome.add_parameter(Parameter::single("news", "page", "3"));
    outcome.add_parameter(Parameter::single("weather", "city", "Lagos"));
    let mut pending = ParameterMap::new();
    pending.insert("lang".into(), values(&["fr"]));
    pending.insert("theme".into(), vec![None]);
    outcome.add_pending_public_parameters(pending);

    page.merge(&outcome, "news");

    assert_eq!(page.action_window(), Some("news"));
    assert_eq!(page.window_state("news"), WindowState::MINIMIZED);
    assert_eq!(page.parameter("news", "page").unwrap().values, vec!["3"]);
    // Other windows are untouched.
    assert_eq!(page.parameter("weather", "city").unwrap().values, vec!["Kigali", "Nairobi"]);
    assert_eq!(page.public_parameters_current().get("lang"), Some(&values(&["fr"])));
    assert!(!page.public_parameters_current().contains_key("theme"));

    let overhead = t.elapsed();
    println!("test_merge_commits_pending_public_parameters: Testing Overhead = {:?}", overhead);
}

/// Verifies the effective public parameter view and prepend helper.
#[test]
fn test_public_parameter_views() {
    let t = Instant::now();

    let mut state = NavigationalState::new();
    state.add_public_parameter_current("a", values(&["1"]));
    state.add_public_parameter_current("b", values(&["2"]));
    state.add_public_parameter_action_resource("a", "0");
    state.add_public_parameter_action_resource("c", "new");
    assert_eq!(state.public_parameters_current()["a"], values(&["0", "1"]));
    assert_eq!(state.public_parameters_current()["c"], values(&["new"]));

    let mut pending = ParameterMap::new();
    pending.insert("b".into(), vec![None]);
    pending.insert("d".into(), values(&["4"]));
    pending.insert("e".into(), vec![]);
    state.add_pending_public_parameters(pending);

    let effective = state.public_parameters();
    assert_eq!(effective.keys().collect::<Vec<_>>(), vec!["a", "c", "d"]);

    let overhead = t.elapsed();
    println!("test_public_parameter_views: Testing Overhead = {:?}", overhead);
}

/// Verifies a clone never sees later writes to the original's current
/// public parameters.
#[test]
fn test_clone_does_not_alias_public_parameters() {
    let t = Instant::now();

    let original = page_state();
    let mut copy = original.clone();
    copy.add_public_parameter_current("lang", values(&["de"]));
    copy.add_public_parameter_action_resource("extra", "x");

    assert_eq!(original.public_parameters_current().get("lang"), Some(&values(&["en"])));
    assert!(!original.public_parameters_current().contains_key("extra"));

    let overhead = t.elapsed();
    println!("test_clone_does_not_alias_public_parameters: Testing Overhead = {:?}", overhead);
}

/// Verifies the shared-form conversion keeps only the resource window's
/// parameters, re-scoped to the shared window.
#[test]
fn test_convert_to_shared_resource() {
    let t = Instant::now();

    let mut state = page_state();
    state.set_resource_window(Some("news".into()));
    state.add_parameter(Parameter::single("news", "ln", "primefaces"));
    state.convert_to_shared_resource("shared");

    assert_eq!(state.url_base(), "/cms/shared");
    assert_eq!(state.resource_window(), Some("shared"));
    assert_eq!(state.render_path(), None);
    assert!(state.window_states().is_empty());
    assert!(state.portlet_modes().is_empty());
    assert!(state.public_parameters_current().is_empty());
    let names: Vec<_> = state.parameters().map(|p| (p.window_id.as_str(), p.name.as_str())).collect();
    assert_eq!(names, vec![("shared", "ln"), ("shared", "page")]);

    let overhead = t.elapsed();
    println!("test_convert_to_shared_resource: Testing Overhead = {:?}", overhead);
}
