//! Career Forge - AI Career Tools
//!
//! Resume insights, ATS scoring, letter writing and job search backed by a
//! gateway that fails over across hosted LLM providers.
//!
//! ## Core Features
//!
//! - **Provider Failover**: OpenRouter, xAI and Gemini tried in config order
//! - **Response Cleaning**: Markdown and code-fence stripping before parsing
//! - **Structured Tasks**: JSON-mode ATS reports and grounded job search
//! - **Profile Model**: Resume profile with stable entry ids and style overrides
//!
//! ## Quick Start
//!
//! ```ignore
//! use careerforge::{AiGateway, CareerAssistant, ConfigLoader};
//!
//! let config = ConfigLoader::load()?;
//! let assistant = CareerAssistant::new(AiGateway::from_config(&config)?);
//! let tips = assistant.insights(&profile).await;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: Providers, failover gateway, response cleaning
//! - [`career`]: Prompts and the career tasks built on the gateway
//! - [`config`]: Layered configuration and credential resolution
//! - [`types`]: Error taxonomy and the resume profile model

pub mod ai;
pub mod career;
pub mod cli;
pub mod config;
pub mod constants;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, ForgeError, LlmError, Result};

// Profile
pub use types::{EntryId, ResumeProfile};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    AiGateway, AiOutcome, GatewayRequest, GatewayResponse, GatewayStats, LlmProvider,
    ResponseCleaner, SharedProvider, with_timeout,
};

// =============================================================================
// Career Re-exports
// =============================================================================

pub use career::{AtsReport, CareerAssistant, JobListing, LetterKind};
