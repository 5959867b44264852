//! ProspectDesk core.
//!
//! The two load-bearing subsystems behind a sales-intelligence dashboard:
//!
//! - an extraction engine ([`extract`]) that turns free-text AI responses
//!   into structured data with graceful degradation, and
//! - a local object store ([`store`]) of independently persisted
//!   collections over a synchronous key-value backend, each broadcasting a
//!   change signal ([`bus`]) that disconnected components answer by
//!   re-reading the collection wholesale.
//!
//! [`assembly`] composes the two into the report generation pipeline, with
//! the AI transport abstracted behind [`provider::IntelligenceProvider`].

pub mod assembly;
pub mod bus;
pub mod error;
pub mod extract;
pub mod prompts;
pub mod provider;
pub mod store;
pub mod types;

pub use assembly::{DomainBriefing, GenerationStart, ReportPipeline};
pub use bus::{Signal, SignalBus, Subscription};
pub use error::{CoreError, UiError};
pub use provider::{GeneratedText, IntelligenceProvider};
pub use store::{FileStorage, MemoryStorage, StorageBackend, Stores};
