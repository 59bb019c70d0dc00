//! Holocron Core - ceremony services
//!
//! Wires the model, access rules, caches and analytics into the operations
//! a team uses to run ceremonies:
//! - Authoring templates and collecting responses
//! - Listing open ceremonies and reading (possibly anonymized) responses
//! - Team health metrics, summaries and cross-tabulations
//! - Team and membership management
//!
//! Persistence goes through the [`DocumentStore`] port and outbound
//! notifications through the [`NotificationDispatcher`] port; neither is
//! implemented here beyond in-process reference adapters.
//!
//! # Example
//!
//! ```rust,ignore
//! use holocron_core::prelude::*;
//!
//! let config = HolocronConfig::load("holocron.toml")?.apply_env_overrides();
//! init_tracing(&config.logging);
//!
//! let app = Holocron::from_config(&config, store, Arc::new(LoggingDispatcher)).await;
//! let team = app.teams().create_team(Some(&user), "Platform").await?;
//! let template = app.ceremonies().create_template(Some(&user), draft).await?;
//! app.shutdown().await;
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod app;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod notifications;
pub mod responses;
pub mod service;
pub mod store;
pub mod team;
pub mod telemetry;

// Re-exports for convenience
pub use app::Holocron;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{HolocronConfig, LoggingConfig, NotificationConfig, TtlConfig};
pub use context::ServiceContext;
pub use error::{
    CeremonyError, CeremonyResult, ConfigError, NotificationError, StoreError, StoreResult,
};
pub use notifications::{
    EventKind, LoggingDispatcher, NotificationDispatcher, NotificationEvent, NotificationStats,
    NotificationWorkerPool,
};
pub use responses::{ResponseStore, ResponseSubmission};
pub use service::{ActiveCeremony, CeremonyService};
pub use store::{
    DocumentQuery, DocumentStore, MemoryDocumentStore, Persisted, Repository, StoredDocument,
    TimeRange,
};
pub use team::{TeamService, TeamWithMembership};
pub use telemetry::init_tracing;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running ceremony services
    pub use crate::{
        init_tracing, ActiveCeremony, CeremonyError, CeremonyResult, CeremonyService, Holocron,
        HolocronConfig, LoggingDispatcher, MemoryDocumentStore, ResponseSubmission, TeamService,
        TimeRange,
    };
    pub use holocron_model::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
