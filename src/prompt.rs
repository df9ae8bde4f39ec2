// src/prompt.rs
// Deterministic prompt assembly. The same context always produces the same
// prompt text.
use std::borrow::Cow;
use std::fmt::Write;

use crate::context::{AiMode, CreatorMode, EventModes, GenerationContext, NarrativePhase, NpcContext};

pub const MAX_RECENT_EVENTS: usize = 3;
pub const MAX_CONNECTED_NODES: usize = 5;
pub const RECENT_EVENT_DESCRIPTION_LIMIT: usize = 200;
pub const CONNECTED_NODE_DESCRIPTION_LIMIT: usize = 150;
const ELLIPSIS: &str = "...";

pub const EVENT_SYSTEM_PROMPT: &str = r#"You are a game master assistant for a gritty survival tabletop RPG.
You write short, playable session events for the game master, never for the players.

Return exactly one JSON object with this shape:
{
  "name": "<short evocative title>",
  "description": "<2-4 sentences the GM can read aloud or paraphrase>",
  "suggestedNodes": [
    { "type": "event|npc|faction|location|item", "name": "<name>", "description": "<one sentence>", "properties": {} }
  ],
  "suggestedConnections": [
    { "fromType": "<node type>", "fromName": "<name>", "toType": "<node type>", "toName": "<name>", "connectionType": "temporal|spatial|factional|ownership" }
  ],
  "estimatedDuration": <minutes of play, 5-300>,
  "pacingImpact": "accelerate|slow|tension|resolve"
}
Use only the listed values for "type", "connectionType" and "pacingImpact"."#;

pub const NPC_SYSTEM_PROMPT: &str = r#"You are a game master assistant for a gritty survival tabletop RPG.
You create non-player characters the game master can drop into a session.

Return exactly one JSON object with this shape:
{
  "name": "<full name or moniker>",
  "description": "<appearance and first impression, 2-3 sentences>",
  "type": "<role of the character, e.g. trader, raider, medic>",
  "properties": {
    "faction": "<faction name or independent>",
    "motivation": "<what drives them>",
    "equipment": ["<item>"],
    "secrets": ["<secret>"],
    "stats": {},
    "relationships": {},
    "backstory": "<a few sentences>"
  }
}"#;

fn scenario_framing(mode: CreatorMode) -> &'static str {
    match mode {
        CreatorMode::Road => {
            "The party is on the road: travel, scarce supplies, hostile terrain and encounters between settlements."
        }
        CreatorMode::City => {
            "The party is in a settlement: factions, trade, politics, rumors and social tension."
        }
    }
}

fn instruction_framing(mode: AiMode) -> &'static str {
    match mode {
        AiMode::Chaos => {
            "Be unpredictable. Introduce surprising complications, new threats or strange opportunities, even if they break the current thread."
        }
        AiMode::Continuity => {
            "Stay consistent with what has happened so far. Build directly on recent events and connected story elements."
        }
    }
}

fn phase_guidance(phase: NarrativePhase) -> &'static str {
    match phase {
        NarrativePhase::Hook => "Draw the players in with a clear reason to act.",
        NarrativePhase::Exploration => "Reveal the world and reward curiosity.",
        NarrativePhase::RisingTension => "Raise the stakes and narrow the options.",
        NarrativePhase::Climax => "Force a decisive confrontation or choice.",
        NarrativePhase::Resolution => "Let consequences land and tie off loose threads.",
    }
}

/// Shortens `text` to at most `limit` characters, marking the cut with `...`.
pub fn truncate(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
        None => Cow::Borrowed(text),
    }
}

pub fn build_event_prompt(context: &GenerationContext, modes: &EventModes) -> String {
    let mut prompt = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "Scenario: {}", scenario_framing(modes.creator_mode));
    let _ = writeln!(prompt, "Current phase: {}", context.current_phase);
    if let Some(phase) = modes.phase {
        let _ = writeln!(prompt, "Phase goal: {}", phase_guidance(phase));
    }
    let _ = writeln!(prompt, "Instructions: {}", instruction_framing(modes.ai_mode));

    if let Some(environment) = &context.environment {
        let _ = writeln!(prompt, "Environment: {}", environment);
    }
    if let Some(threat_level) = &context.threat_level {
        let _ = writeln!(prompt, "Threat level: {}", threat_level);
    }
    if let Some(time_of_day) = &context.time_of_day {
        let _ = writeln!(prompt, "Time of day: {}", time_of_day);
    }
    if let Some(weather) = &context.weather {
        let _ = writeln!(prompt, "Weather: {}", weather);
    }
    if let Some(player_count) = context.player_count {
        let _ = writeln!(prompt, "Players: {}", player_count);
    }

    let skip = context.recent_events.len().saturating_sub(MAX_RECENT_EVENTS);
    let recent = &context.recent_events[skip..];
    if !recent.is_empty() {
        let _ = writeln!(prompt, "\nRecent events:");
        for event in recent {
            let description = truncate(&event.description, RECENT_EVENT_DESCRIPTION_LIMIT);
            match &event.phase {
                Some(phase) => {
                    let _ = writeln!(prompt, "- {} ({}): {}", event.name, phase, description);
                }
                None => {
                    let _ = writeln!(prompt, "- {}: {}", event.name, description);
                }
            }
        }
    }

    if !context.connected_nodes.is_empty() {
        let _ = writeln!(prompt, "\nConnected story elements:");
        for node in context.connected_nodes.iter().take(MAX_CONNECTED_NODES) {
            let _ = writeln!(
                prompt,
                "- [{}] {}: {}",
                node.node_type,
                node.name,
                truncate(&node.description, CONNECTED_NODE_DESCRIPTION_LIMIT)
            );
        }
    }

    prompt.push_str("\nGenerate the next event for this session as a single JSON object.");
    prompt
}

pub fn build_npc_prompt(context: &NpcContext, setting: CreatorMode) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Setting: {}", scenario_framing(setting));

    let optional_lines = [
        ("Faction", &context.faction),
        ("Role", &context.role),
        ("Threat level", &context.threat_level),
        ("Relationship to the party", &context.relationship),
        ("Importance", &context.importance),
    ];
    for (label, value) in optional_lines {
        if let Some(value) = value {
            let _ = writeln!(prompt, "{}: {}", label, value);
        }
    }

    prompt.push_str("\nCreate one NPC for this setting as a single JSON object.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modes(context: &GenerationContext) -> EventModes {
        context.validate().expect("test context should validate")
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly", 7), "exactly");
        assert_eq!(truncate("abcdefgh", 3), "abc...");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }

    #[test]
    fn optional_hints_appear_in_fixed_order() {
        let mut context = GenerationContext::new("s", "road", "hook", "chaos");
        context.player_count = Some(4);
        context.weather = Some("acid rain".into());
        context.environment = Some("salt flats".into());
        context.time_of_day = Some("dusk".into());
        context.threat_level = Some("high".into());

        let prompt = build_event_prompt(&context, &modes(&context));
        let positions: Vec<usize> = [
            "Environment: salt flats",
            "Threat level: high",
            "Time of day: dusk",
            "Weather: acid rain",
            "Players: 4",
        ]
        .iter()
        .map(|line| prompt.find(line).expect(line))
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn absent_hints_are_omitted() {
        let context = GenerationContext::new("s", "city", "climax", "continuity");
        let prompt = build_event_prompt(&context, &modes(&context));
        assert!(!prompt.contains("Environment:"));
        assert!(!prompt.contains("Players:"));
        assert!(!prompt.contains("Recent events:"));
        assert!(!prompt.contains("Connected story elements:"));
        assert!(prompt.contains("settlement"));
        assert!(prompt.contains("Stay consistent"));
        assert!(prompt.contains("Phase goal: Force a decisive"));
    }

    #[test]
    fn only_last_three_events_are_summarized() {
        let mut context = GenerationContext::new("s", "road", "exploration", "chaos");
        for index in 1..=5 {
            context = context.with_recent_event(format!("Event {}", index), "x".repeat(250), None);
        }
        let prompt = build_event_prompt(&context, &modes(&context));

        assert!(!prompt.contains("Event 1"));
        assert!(!prompt.contains("Event 2"));
        assert!(prompt.contains("- Event 3: "));
        assert!(prompt.contains("- Event 5: "));
        assert!(prompt.contains(&format!("{}...", "x".repeat(200))));
        assert!(!prompt.contains(&"x".repeat(201)));
    }

    #[test]
    fn only_first_five_nodes_are_summarized() {
        let mut context = GenerationContext::new("s", "road", "hook", "chaos");
        for index in 1..=7 {
            context = context.with_connected_node("npc", format!("Node {}", index), "y".repeat(160));
        }
        let prompt = build_event_prompt(&context, &modes(&context));

        assert!(prompt.contains("- [npc] Node 5: "));
        assert!(!prompt.contains("Node 6"));
        assert!(prompt.contains(&format!("{}...", "y".repeat(150))));
        assert!(!prompt.contains(&"y".repeat(151)));
    }

    #[test]
    fn unknown_phase_is_passed_through_without_guidance() {
        let context = GenerationContext::new("s", "road", "aftermath", "chaos")
            .with_recent_event("Raid", "The depot burned.", Some("climax"));
        let prompt = build_event_prompt(&context, &modes(&context));
        assert!(prompt.contains("Current phase: aftermath"));
        assert!(!prompt.contains("Phase goal:"));
        assert!(prompt.contains("- Raid (climax): The depot burned."));
    }

    #[test]
    fn event_prompt_is_deterministic() {
        let context = GenerationContext::new("s", "city", "hook", "chaos")
            .with_recent_event("Arrival", "Gates open.", None)
            .with_connected_node("faction", "Rust Kings", "Scrap barons.");
        let modes = modes(&context);
        assert_eq!(
            build_event_prompt(&context, &modes),
            build_event_prompt(&context, &modes)
        );
    }

    #[test]
    fn npc_prompt_lists_present_fields_in_order() {
        let context = NpcContext {
            setting: "city".into(),
            faction: Some("Rust Kings".into()),
            role: None,
            threat_level: Some("low".into()),
            relationship: Some("rival".into()),
            importance: Some("major".into()),
        };
        let prompt = build_npc_prompt(&context, CreatorMode::City);

        assert!(!prompt.contains("Role:"));
        let faction = prompt.find("Faction: Rust Kings").unwrap();
        let threat = prompt.find("Threat level: low").unwrap();
        let relationship = prompt.find("Relationship to the party: rival").unwrap();
        let importance = prompt.find("Importance: major").unwrap();
        assert!(faction < threat && threat < relationship && relationship < importance);
    }
}
