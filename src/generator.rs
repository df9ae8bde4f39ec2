// src/generator.rs
use tokio::time::{Duration, Instant, sleep};
use uuid::Uuid;

use crate::content::{GeneratedEvent, GeneratedNpc};
use crate::context::{GenerationContext, NpcContext};
use crate::error::{ForgeError, Result, UpstreamError};
use crate::prompt::{EVENT_SYSTEM_PROMPT, NPC_SYSTEM_PROMPT, build_event_prompt, build_npc_prompt};
use crate::schema;
use crate::settings::Settings;
use crate::upstream::{CompletionBackend, CompletionRequest};

pub const NPC_TEMPERATURE: f32 = 0.7;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(200);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Turns session context into validated event and NPC content.
///
/// The generator keeps no state between calls; one instance can serve any
/// number of concurrent requests.
pub struct ContentGenerator<B> {
    backend: B,
    max_retries: u32,
    max_tokens: u32,
}

impl<B: CompletionBackend> ContentGenerator<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        Self {
            backend,
            max_retries: settings.max_retries,
            max_tokens: settings.max_tokens,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub async fn generate_event(&self, context: &GenerationContext) -> Result<GeneratedEvent> {
        let modes = context.validate()?;
        let request = CompletionRequest {
            system: EVENT_SYSTEM_PROMPT.to_string(),
            prompt: build_event_prompt(context, &modes),
            temperature: modes.ai_mode.temperature(),
            json_object: true,
            max_tokens: self.max_tokens,
        };

        let request_id = Uuid::new_v4();
        log::debug!(
            "event_request request_id={} session_id={} creator_mode={} ai_mode={} phase={} recent_events={} connected_nodes={}",
            request_id,
            context.session_id,
            modes.creator_mode,
            modes.ai_mode,
            context.current_phase,
            context.recent_events.len(),
            context.connected_nodes.len()
        );

        let started = Instant::now();
        let text = self.complete(&request, request_id).await?;
        let latency_ms = started.elapsed().as_millis();

        let event = schema::parse_event(&text).inspect_err(|e| {
            log::warn!(
                "event_rejected request_id={} latency_ms={} error={}",
                request_id,
                latency_ms,
                e
            )
        })?;

        log::info!(
            "event_generated request_id={} session_id={} latency_ms={} nodes={} connections={} duration={} pacing={}",
            request_id,
            context.session_id,
            latency_ms,
            event.suggested_nodes.len(),
            event.suggested_connections.len(),
            event.estimated_duration,
            event.pacing_impact
        );
        Ok(event)
    }

    pub async fn generate_npc(&self, context: &NpcContext) -> Result<GeneratedNpc> {
        let setting = context.validate()?;
        let request = CompletionRequest {
            system: NPC_SYSTEM_PROMPT.to_string(),
            prompt: build_npc_prompt(context, setting),
            temperature: NPC_TEMPERATURE,
            json_object: true,
            max_tokens: self.max_tokens,
        };

        let request_id = Uuid::new_v4();
        log::debug!("npc_request request_id={} setting={}", request_id, setting);

        let started = Instant::now();
        let text = self.complete(&request, request_id).await?;
        let latency_ms = started.elapsed().as_millis();

        let npc = schema::parse_npc(&text).inspect_err(|e| {
            log::warn!(
                "npc_rejected request_id={} latency_ms={} error={}",
                request_id,
                latency_ms,
                e
            )
        })?;

        log::info!(
            "npc_generated request_id={} latency_ms={} name={:?} faction={:?} equipment={} secrets={}",
            request_id,
            latency_ms,
            npc.name,
            npc.properties.faction,
            npc.properties.equipment.len(),
            npc.properties.secrets.len()
        );
        Ok(npc)
    }

    // Calls the backend, retrying only upstream failures and only as many
    // times as configured.
    async fn complete(&self, request: &CompletionRequest, request_id: Uuid) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            let outcome = match self.backend.complete(request).await {
                Ok(text) if text.trim().is_empty() => Err(UpstreamError::EmptyResponse),
                other => other,
            };

            match outcome {
                Ok(text) => return Ok(text),
                Err(error) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = retry_delay(attempt);
                    log::warn!(
                        "generation_retry request_id={} attempt={} delay_ms={} error={}",
                        request_id,
                        attempt,
                        delay.as_millis(),
                        error
                    );
                    sleep(delay).await;
                }
                Err(error) => {
                    log::error!(
                        "generation_failed request_id={} attempts={} error={}",
                        request_id,
                        attempt + 1,
                        error
                    );
                    return Err(ForgeError::generation(
                        format!("AI content generation failed: {}", error),
                        error,
                    ));
                }
            }
        }
    }
}

fn retry_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RETRY_BASE_DELAY.saturating_mul(factor).min(MAX_RETRY_DELAY)
}
