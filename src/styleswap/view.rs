//! Presentation layer.
//!
//! [`ViewModel::from_state`] derives everything a front end shows from an
//! [`ApplicationState`]; [`render_text`] draws that model for a terminal.

use crate::controller::{AppStatus, ApplicationState};
use crate::presets::BACKDROP_PRESETS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Credentials must be connected before the editor is usable.
    CredentialGate,
    Editor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetTile {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    /// Selected and not overridden by custom text.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: Screen,
    pub upload_label: &'static str,
    pub show_start_over: bool,
    pub presets: Vec<PresetTile>,
    pub custom_prompt: String,
    pub generate_enabled: bool,
    pub generate_label: &'static str,
    pub show_progress: bool,
    pub error_banner: Option<String>,
    pub has_source: bool,
    pub download_enabled: bool,
}

impl ViewModel {
    pub fn from_state(state: &ApplicationState) -> Self {
        let custom_active = !state.custom_prompt.trim().is_empty();
        let generating = state.is_generating();

        Self {
            screen: if state.needs_credential {
                Screen::CredentialGate
            } else {
                Screen::Editor
            },
            upload_label: if state.image.is_some() {
                "New Photo"
            } else {
                "Upload Photo"
            },
            show_start_over: state.image.is_some(),
            presets: BACKDROP_PRESETS
                .iter()
                .map(|preset| PresetTile {
                    id: preset.id,
                    name: preset.name,
                    icon: preset.icon,
                    highlighted: !custom_active && preset.id == state.selected_preset.id,
                })
                .collect(),
            custom_prompt: state.custom_prompt.clone(),
            generate_enabled: state.image.is_some() && !generating && !state.needs_credential,
            generate_label: if generating {
                "Generating..."
            } else {
                "Generate Backdrop"
            },
            show_progress: generating,
            error_banner: match state.status {
                AppStatus::Error => state.error.clone(),
                _ => None,
            },
            has_source: state.image.is_some(),
            download_enabled: state.current_result().is_some(),
        }
    }
}

/// Plain-text rendering for terminals and logs.
pub fn render_text(view: &ViewModel) -> String {
    let mut out = String::new();
    if view.screen == Screen::CredentialGate {
        out.push_str("== StyleSwap ==\n");
        out.push_str("An API key is required. Connect a Gemini API key to continue.\n");
        return out;
    }

    out.push_str(&format!("== StyleSwap ==  [{}]", view.upload_label));
    if view.show_start_over {
        out.push_str(" [Start Over]");
    }
    out.push('\n');

    out.push_str("Presets:\n");
    for tile in &view.presets {
        let marker = if tile.highlighted { '*' } else { ' ' };
        out.push_str(&format!(" {} {} ({})\n", marker, tile.name, tile.icon));
    }
    if !view.custom_prompt.trim().is_empty() {
        out.push_str(&format!("Custom style: {}\n", view.custom_prompt));
    }

    out.push_str(&format!(
        "Source: {}\n",
        if view.has_source { "loaded" } else { "none" }
    ));
    out.push_str(&format!(
        "[{}]{}\n",
        view.generate_label,
        if view.generate_enabled { "" } else { " (disabled)" }
    ));
    if view.show_progress {
        out.push_str("Working on your backdrop...\n");
    }
    if let Some(error) = &view.error_banner {
        out.push_str(&format!("Error: {}\n", error));
    }
    if view.download_enabled {
        out.push_str("Result ready [Download]\n");
    }
    out
}
