//! Remote scopes ("spaces") that files are organised under.

use std::fmt;

use serde_json::Value;

use crate::error::{Result, SpaceFsError};

/// The remote scope a call is addressed to.
///
/// The home space is addressed by omitting the space qualifier entirely.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Space {
    #[default]
    Home,
    Named(String),
}

impl Space {
    /// Build a space from an optional id; empty ids and `"home"` mean [`Space::Home`].
    pub fn from_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            None | Some("") => Space::Home,
            Some(id) if id.eq_ignore_ascii_case("home") => Space::Home,
            Some(id) => Space::Named(id.to_string()),
        }
    }

    /// The value for `-space-id`, or `None` for the home space.
    pub fn qualifier(&self) -> Option<&str> {
        match self {
            Space::Home => None,
            Space::Named(id) => Some(id.as_str()),
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, Space::Home)
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::Home => write!(f, "home"),
            Space::Named(id) => write!(f, "{}", id),
        }
    }
}

/// A space as reported by `ls-spaces` / `create-space`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceInfo {
    pub id: String,
    pub name: String,
}

impl SpaceInfo {
    pub fn space(&self) -> Space {
        Space::from_id(Some(&self.id))
    }

    pub(crate) fn from_json(json: &Value) -> Option<Self> {
        let id = crate::fs::node::json_id(json.get("id")?)?;
        let name = json
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| id.clone());
        Some(Self { id, name })
    }

    /// Parse an `ls-spaces` response: an array, or an object wrapping one under `spaces`.
    pub(crate) fn parse_list(response: &Value) -> Result<Vec<Self>> {
        let items = response
            .as_array()
            .or_else(|| response.get("spaces").and_then(|v| v.as_array()))
            .ok_or_else(|| {
                SpaceFsError::CliProtocol("expected an array of spaces".to_string())
            })?;
        Ok(items.iter().filter_map(Self::from_json).collect())
    }
}
