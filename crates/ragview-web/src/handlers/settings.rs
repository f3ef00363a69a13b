//! Configuration pane.

use axum::{extract::State, response::Html, Form};
use minijinja::context;
use serde::Deserialize;
use std::path::PathBuf;

use ragview_common::{RagviewError, Result};
use ragview_config::{ExplorerConfig, MAX_COMMUNITY_LEVEL};

use crate::state::SharedState;
use crate::templates::{render, Banner};

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub root_dir: String,
    #[serde(default)]
    pub community_level: String,
    #[serde(default)]
    pub response_type: String,
}

impl SettingsForm {
    fn parse(&self) -> Result<ExplorerConfig> {
        let community_level = self.community_level.trim().parse::<u8>().map_err(|_| {
            RagviewError::Config(format!(
                "Community level must be a number between 0 and {MAX_COMMUNITY_LEVEL}."
            ))
        })?;
        let response_type = self.response_type.trim();
        if response_type.is_empty() {
            return Err(RagviewError::Config("Response type cannot be empty.".to_string()));
        }
        let settings = ExplorerConfig {
            root_dir: PathBuf::from(self.root_dir.trim()),
            community_level,
            response_type: response_type.to_string(),
        };
        settings
            .validate()
            .map_err(|e| RagviewError::Config(e.to_string()))?;
        Ok(settings)
    }
}

async fn settings_view(state: &SharedState, banners: Vec<Banner>) -> Html<String> {
    let settings = state.settings().await;
    render(
        &state.templates,
        "settings.html",
        context! {
            active => "settings",
            settings => settings,
            banners => banners,
            max_level => MAX_COMMUNITY_LEVEL,
        },
    )
}

pub async fn settings_page(State(state): State<SharedState>) -> Html<String> {
    settings_view(&state, Vec::new()).await
}

/// POST /settings - validate and apply; a real change empties the session cache
pub async fn settings_save(
    State(state): State<SharedState>,
    Form(form): Form<SettingsForm>,
) -> Html<String> {
    let banner = match form.parse() {
        Ok(settings) => {
            if state.update_settings(settings).await {
                Banner::success("Settings saved. Session cache cleared.")
            } else {
                Banner::info("Settings unchanged.")
            }
        }
        Err(e) => Banner::error(e.to_string()),
    };
    settings_view(&state, vec![banner]).await
}

pub async fn cache_clear(State(state): State<SharedState>) -> Html<String> {
    state.clear_caches();
    settings_view(&state, vec![Banner::success("Session cache cleared.")]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(root: &str, level: &str, response_type: &str) -> SettingsForm {
        SettingsForm {
            root_dir: root.into(),
            community_level: level.into(),
            response_type: response_type.into(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let settings = form(" ./other ", "3", "Single Paragraph").parse().unwrap();
        assert_eq!(settings.root_dir, PathBuf::from("./other"));
        assert_eq!(settings.community_level, 3);
        assert_eq!(settings.response_type, "Single Paragraph");
    }

    #[test]
    fn test_parse_rejects_out_of_range_level() {
        assert!(form("./ragtest", "6", "x").parse().is_err());
        assert!(form("./ragtest", "-1", "x").parse().is_err());
        assert!(form("./ragtest", "two", "x").parse().is_err());
    }

    #[test]
    fn test_parse_rejects_blank_fields() {
        let err = form("", "2", "x").parse().unwrap_err();
        assert!(matches!(err, RagviewError::Config(_)));
        assert!(form("./ragtest", "2", "  ").parse().is_err());
    }
}
