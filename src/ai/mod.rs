//! AI Integration Layer
//!
//! Hosted LLM providers behind a sequential failover gateway.

pub mod cleaning;
pub mod gateway;
pub mod provider;
pub mod timeout;

#[cfg(test)]
pub(crate) mod testing;

pub use cleaning::ResponseCleaner;
pub use gateway::{
    AiGateway, AiOutcome, AttemptOutcome, AttemptRecord, FailureKind, GatewayRequest,
    GatewayResponse, GatewayStats,
};
pub use provider::{
    Attachment, ChatProvider, GeminiProvider, GroundingSource, LlmProvider, ProviderConfig,
    ProviderKind, ProviderReply, ProviderRequest, SharedProvider, create_provider,
};
pub use timeout::with_timeout;
