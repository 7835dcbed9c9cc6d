//! Overlay control panel.
//!
//! Mirrors the demo's two fieldsets: rotation toggles and the view
//! selection. The panel never mutates application state directly; it
//! emits [`UiAction`]s that the app drains once per frame.

use astroview_core::{CameraView, RotationDirection, ViewerSettings};
use egui::{Align2, Context};

/// State changes requested through the control panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    /// Turn the model spin on or off.
    SetRotationEnabled(bool),
    /// Change the spin direction.
    SetRotationDirection(RotationDirection),
    /// Switch the camera view.
    SetView(CameraView),
}

/// The overlay panel in the top-left corner of the viewport.
#[derive(Default)]
pub struct ControlPanel {
    actions: Vec<UiAction>,
}

impl ControlPanel {
    /// Render the panel, queueing an action for every changed control.
    pub fn show(&mut self, ctx: &Context, settings: &ViewerSettings) {
        egui::Window::new("Controls")
            .anchor(Align2::LEFT_TOP, [15.0, 15.0])
            .title_bar(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.group(|ui| {
                    ui.strong("Rotation");

                    let mut enabled = settings.rotation_enabled;
                    if ui.checkbox(&mut enabled, "Enable rotation.").changed() {
                        self.actions.push(UiAction::SetRotationEnabled(enabled));
                    }

                    let mut clockwise =
                        settings.rotation_direction == RotationDirection::Clockwise;
                    if ui.checkbox(&mut clockwise, "Clockwise rotation.").changed() {
                        let direction = if clockwise {
                            RotationDirection::Clockwise
                        } else {
                            RotationDirection::CounterClockwise
                        };
                        self.actions.push(UiAction::SetRotationDirection(direction));
                    }
                });

                ui.group(|ui| {
                    ui.strong("View");

                    let views = [
                        (CameraView::Side, "Side view."),
                        (CameraView::Top, "Top view"),
                        (CameraView::Free, "Free view."),
                    ];
                    for (view, label) in views {
                        if ui.radio(settings.view == view, label).clicked()
                            && settings.view != view
                        {
                            self.actions.push(UiAction::SetView(view));
                        }
                    }
                });
            });
    }

    /// Drain the queued actions.
    pub fn take_actions(&mut self) -> Vec<UiAction> {
        std::mem::take(&mut self.actions)
    }
}
