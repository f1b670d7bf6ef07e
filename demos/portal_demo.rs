use navstate::{ChaChaTokenCipher, InboundRequest, ParserBuilder, PortalUrlParser};
use navstate_core::{Parameter, PortletMode, WindowState};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let parser = PortalUrlParser::from_builder(
        ParserBuilder::new()
            .share_library("primefaces")
            .with_state_cache(true),
        ChaChaTokenCipher::generate(),
    )?;

    // A first visit carries no token and starts from an empty state.
    let request = InboundRequest::from_uri("/cms", "/cms/portal", "p").with_origin("demo-session");
    let mut state = parser.parse(&request)?;

    state.set_render_path(Some("/home/news".into()));
    state.set_window_state("news", WindowState::MAXIMIZED);
    state.set_portlet_mode("news", PortletMode::EDIT);
    state.add_parameter(Parameter::single("news", "page", "3"));
    let page_url = parser.build(&state);
    println!("page URL:     {page_url}");

    let mut resource = state.clone();
    resource.set_resource_window(Some("news".into()));
    resource.add_parameter(Parameter::single("news", "ln", "primefaces"));
    resource.add_parameter(Parameter::single("news", "javax.faces.resource", "core.js"));
    let shared_url = parser.build(&resource);
    println!("shared URL:   {shared_url}");

    let shared_request =
        InboundRequest::from_uri("/cms", &shared_url, "p").with_origin("other-session");
    let back = parser.parse(&shared_request)?;
    println!("shared owner: {:?}", back.render_path());

    // Following the page URL records its state for the session, so a
    // token-less follow-up resumes from it.
    parser.parse(&InboundRequest::from_uri("/cms", &page_url, "p").with_origin("demo-session"))?;
    let resumed = parser.parse(&request)?;
    println!("resumed:      {:?}", resumed.render_path());

    for (name, stats) in parser.caches().stats() {
        tracing::info!(
            "{}: {} entries in, {} evicted, hit rate {:.2}",
            name,
            stats.insertions,
            stats.evictions,
            stats.hit_rate()
        );
    }
    parser.close();
    Ok(())
}
