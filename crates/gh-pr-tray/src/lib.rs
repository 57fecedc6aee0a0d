//! GitHub PR tray agent
//!
//! Authenticates through the OAuth device flow, periodically lists the pull
//! requests the user authored or was asked to review, and offers them as
//! clickable entries.
//!
//! - [`device_flow`] obtains and persists a token
//! - [`aggregator`] turns the notification feed into grouped PRs
//! - [`orchestrator`] runs one cancellable cycle at a time
//! - [`selector`] multiplexes clicks on a runtime-sized set of entries

pub mod aggregator;
pub mod build_status;
pub mod cancel;
pub mod console;
pub mod demo;
pub mod desktop;
pub mod device_flow;
pub mod domain_models;
pub mod logger;
pub mod menu;
pub mod orchestrator;
pub mod selector;
mod utils;

#[cfg(test)]
mod test_support;

pub use aggregator::{FetchError, PrAggregator};
pub use device_flow::{AuthError, DeviceAuthFlow, DeviceFlowSettings};
pub use domain_models::{BuildStatus, PrGroups, PullRequest, UserPrs};
pub use orchestrator::{
    ClientFactory, OctocrabClientFactory, RefreshHandle, RefreshOrchestrator, RefreshReason,
    RefreshSettings, Services,
};
