use criterion::{black_box, criterion_group, criterion_main, Criterion};
use navstate_codec::{Reader, Writer};
use navstate_core::{NavigationalState, Parameter, PortletMode, WindowState};

fn sample_state() -> NavigationalState {
    let mut state = NavigationalState::new();
    state.set_render_path(Some("/portal/home/news".into()));
    state.set_resource_window(Some("news".into()));
    for window in ["news", "weather", "search"] {
        state.set_window_state(window, WindowState::NORMAL);
        state.set_portlet_mode(window, PortletMode::VIEW);
        state.add_parameter(Parameter::new(window, "page", ["1", "2", "3"]));
    }
    state.add_public_parameter_current("lang", vec![Some("en".into())]);
    state
}

fn framing(c: &mut Criterion) {
    c.bench_function("compact_write_str", |b| {
        b.iter(|| {
            let mut out = Writer::with_capacity(64);
            out.write_str(black_box(Some("javax.faces.resource")));
            out.into_string()
        })
    });

    let mut out = Writer::new();
    out.write_str(Some("javax.faces.resource"));
    let encoded = out.into_string();
    c.bench_function("compact_read_str", |b| {
        b.iter(|| Reader::new(black_box(&encoded)).read_str().map(|s| s.map(str::len)))
    });
}

fn state_codec(c: &mut Criterion) {
    let state = sample_state();
    let bytes = state.encode();

    c.bench_function("state_encode", |b| b.iter(|| black_box(&state).encode()));
    c.bench_function("state_decode", |b| {
        b.iter(|| NavigationalState::decode(black_box(&bytes)).is_ok())
    });
}

criterion_group!(benches, framing, state_codec);
criterion_main!(benches);
