mod config;
mod css;
mod error;
mod gmaps;
mod host;
mod js;
mod logging;
mod overlay;
mod panel;
mod storage;
mod surfaces;

use config::{Config, SCRIPT_VERSION};

fn main() {
    console_error_panic_hook::set_once();
    let config = Config::from_page();
    logging::init(config.debug);
    tracing::info!(version = SCRIPT_VERSION, debug = config.debug, "starting");

    wasm_bindgen_futures::spawn_local(async move {
        // The overlay stays inert on failure; the editor itself is unaffected.
        if let Err(e) = overlay::bootstrap(config).await {
            tracing::error!(error = %e, "initialization failed");
        }
    });
}
