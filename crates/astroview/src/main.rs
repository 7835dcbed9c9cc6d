//! Astroview - Interactive Astrobee Model Viewer
//!
//! Renders the Astrobee robot in a window with an overlaid control panel
//! for toggling rotation, spin direction and camera view. Redraws are
//! driven by an idle-aware frame loop, so the viewer uses no CPU while
//! nothing animates.

#![warn(missing_docs)]

mod app;
mod logging_setup;
mod ui;
mod window;

use anyhow::Result;
use astroview_core::ViewerSettings;
use tracing::{error, info};
use winit::event_loop::EventLoop;

use crate::app::App;

/// The main entry point for the application.
fn main() -> Result<()> {
    let settings = ViewerSettings::load();
    let _log_guard = logging_setup::init(&settings.log)?;

    info!("==========================================");
    info!("===     Astroview Session Started      ===");
    info!("==========================================");

    let event_loop = EventLoop::new()?;
    let mut app: Option<App> = None;

    #[allow(deprecated)]
    event_loop.run(move |event, elwt| {
        if app.is_none() {
            match pollster::block_on(App::new(elwt, settings.clone())) {
                Ok(created) => {
                    app = Some(created);
                    info!("--- Entering Main Event Loop ---");
                }
                Err(e) => {
                    error!("Failed to create App: {:#}", e);
                    elwt.exit();
                    return;
                }
            }
        }

        if let Some(app_ref) = &mut app {
            if let Err(e) = app_ref.handle_event(event, elwt) {
                error!("Application error: {}", e);
                elwt.exit();
            }
        }
    })?;

    Ok(())
}
