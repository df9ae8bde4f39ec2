// src/content.rs
// Normalized generation results. Values of these types only ever come out of
// the schema validator, never straight from the model.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub const MIN_DURATION_MINUTES: u32 = 5;
pub const MAX_DURATION_MINUTES: u32 = 300;
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

pub const DEFAULT_FACTION: &str = "independent";
pub const DEFAULT_MOTIVATION: &str = "survival";
pub const DEFAULT_BACKSTORY: &str = "Unknown background";

// Kinds of story element that can be suggested for the session graph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeType {
    Event,
    Npc,
    Faction,
    Location,
    Item,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionType {
    Temporal,
    Spatial,
    Factional,
    Ownership,
}

// How an event shifts the tempo of the session.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PacingImpact {
    Accelerate,
    #[default]
    Slow,
    Tension,
    Resolve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedNode {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedConnection {
    pub from_type: String,
    pub from_name: String,
    pub to_type: String,
    pub to_name: String,
    pub connection_type: ConnectionType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedEvent {
    pub name: String,
    pub description: String,
    pub suggested_nodes: Vec<SuggestedNode>,
    pub suggested_connections: Vec<SuggestedConnection>,
    pub estimated_duration: u32, // Minutes, always within [5, 300].
    pub pacing_impact: PacingImpact,
}

impl GeneratedEvent {
    // Suggested nodes of one kind, in the order the model listed them.
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &SuggestedNode> {
        self.suggested_nodes
            .iter()
            .filter(move |node| node.node_type == node_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcProperties {
    pub faction: String,
    pub motivation: String,
    pub equipment: Vec<Value>,
    pub secrets: Vec<Value>,
    pub stats: Map<String, Value>,
    pub relationships: Map<String, Value>,
    pub backstory: String,
    // Any other keys the model added are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for NpcProperties {
    fn default() -> Self {
        NpcProperties {
            faction: DEFAULT_FACTION.to_string(),
            motivation: DEFAULT_MOTIVATION.to_string(),
            equipment: Vec::new(),
            secrets: Vec::new(),
            stats: Map::new(),
            relationships: Map::new(),
            backstory: DEFAULT_BACKSTORY.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedNpc {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub npc_type: String,
    pub properties: NpcProperties,
}
