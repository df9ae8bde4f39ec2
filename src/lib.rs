pub mod content;
pub mod context;
pub mod error;
pub mod generator;
pub mod logging;
pub mod prompt;
pub mod schema;
pub mod settings;
pub mod upstream;

// Re-export commonly used items for easier access
pub use content::{
    ConnectionType, GeneratedEvent, GeneratedNpc, NodeType, NpcProperties, PacingImpact,
    SuggestedConnection, SuggestedNode,
};
pub use context::{AiMode, CreatorMode, GenerationContext, NarrativePhase, NpcContext};
pub use error::{ForgeError, Result, UpstreamError};
pub use generator::ContentGenerator;
pub use settings::Settings;
pub use upstream::{CompletionBackend, CompletionRequest, OpenAIBackend};
