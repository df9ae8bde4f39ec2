// src/context.rs
// Inputs of a generation call. These arrive as loosely typed JSON from the
// session layer, so mode fields stay plain strings until `validate` checks them.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::{ForgeError, Result};

// Narrative setting of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum CreatorMode {
    Road, // Travel and survival focus.
    City, // Settlement and social focus.
}

// Generation style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum AiMode {
    Chaos,
    Continuity,
}

impl AiMode {
    pub fn temperature(self) -> f32 {
        match self {
            AiMode::Chaos => 0.8,
            AiMode::Continuity => 0.4,
        }
    }
}

// Known narrative phases. The phase on a context is free-form; anything
// outside this set is still accepted and passed through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NarrativePhase {
    Hook,
    Exploration,
    RisingTension,
    Climax,
    Resolution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecentEvent {
    pub name: String,
    pub description: String,
    pub phase: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectedNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationContext {
    pub session_id: String,
    pub creator_mode: String,
    pub current_phase: String,
    pub ai_mode: String,
    pub recent_events: Vec<RecentEvent>, // Oldest first.
    pub connected_nodes: Vec<ConnectedNode>,
    pub environment: Option<String>,
    pub threat_level: Option<String>,
    pub time_of_day: Option<String>,
    pub weather: Option<String>,
    pub player_count: Option<u32>,
}

// Modes of a context that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventModes {
    pub creator_mode: CreatorMode,
    pub ai_mode: AiMode,
    pub phase: Option<NarrativePhase>,
}

impl GenerationContext {
    pub fn new(
        session_id: impl Into<String>,
        creator_mode: impl Into<String>,
        current_phase: impl Into<String>,
        ai_mode: impl Into<String>,
    ) -> Self {
        GenerationContext {
            session_id: session_id.into(),
            creator_mode: creator_mode.into(),
            current_phase: current_phase.into(),
            ai_mode: ai_mode.into(),
            ..Default::default()
        }
    }

    /// Decodes a context from request JSON. Type mismatches are reported as
    /// validation failures so the caller sees a single error kind for bad input.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ForgeError::validation(format!("Invalid generation context: {}", e)))
    }

    pub fn with_recent_event(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        phase: Option<&str>,
    ) -> Self {
        self.recent_events.push(RecentEvent {
            name: name.into(),
            description: description.into(),
            phase: phase.map(String::from),
        });
        self
    }

    pub fn with_connected_node(
        mut self,
        node_type: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.connected_nodes.push(ConnectedNode {
            node_type: node_type.into(),
            name: name.into(),
            description: description.into(),
        });
        self
    }

    pub fn validate(&self) -> Result<EventModes> {
        if self.session_id.trim().is_empty() {
            return Err(ForgeError::validation("Missing sessionId"));
        }
        let creator_mode = self.creator_mode.parse::<CreatorMode>().map_err(|_| {
            ForgeError::validation(format!(
                "Invalid creatorMode '{}': expected road or city",
                self.creator_mode
            ))
        })?;
        if self.current_phase.trim().is_empty() {
            return Err(ForgeError::validation("Missing currentPhase"));
        }
        let ai_mode = self.ai_mode.parse::<AiMode>().map_err(|_| {
            ForgeError::validation(format!(
                "Invalid aiMode '{}': expected chaos or continuity",
                self.ai_mode
            ))
        })?;

        Ok(EventModes {
            creator_mode,
            ai_mode,
            phase: self.current_phase.parse().ok(),
        })
    }
}

// Input for NPC generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NpcContext {
    pub setting: String,
    pub faction: Option<String>,
    pub role: Option<String>,
    pub threat_level: Option<String>,
    pub relationship: Option<String>,
    pub importance: Option<String>,
}

impl NpcContext {
    pub fn new(setting: impl Into<String>) -> Self {
        NpcContext {
            setting: setting.into(),
            ..Default::default()
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| ForgeError::validation(format!("Invalid NPC context: {}", e)))
    }

    pub fn validate(&self) -> Result<CreatorMode> {
        self.setting.parse::<CreatorMode>().map_err(|_| {
            ForgeError::validation(format!(
                "Invalid setting '{}': expected road or city",
                self.setting
            ))
        })
    }
}
