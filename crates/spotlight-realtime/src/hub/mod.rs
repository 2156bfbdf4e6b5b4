//! The message hub: sole owner of the user → connection registry.
//!
//! Every register, unregister, and routing decision is a [`command::HubCommand`]
//! processed one at a time by the [`Hub`] task. Callers hold a cloneable
//! [`HubHandle`].

pub mod command;
pub mod handle;
pub mod registry;

pub use handle::HubHandle;
pub use registry::{Hub, RouteOutcome};
