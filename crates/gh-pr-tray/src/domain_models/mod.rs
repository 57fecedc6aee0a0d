//! Domain models
//!
//! Value types produced by one aggregation cycle and discarded at the
//! start of the next.

mod pull_request;

pub use pull_request::{BuildStatus, PrGroups, PullRequest, UserPrs};
