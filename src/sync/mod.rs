//! Store <-> Engine Synchronization
//!
//! The runtime half of the crate:
//! - [`adapter::BindingAdapter`] moves data between the canonical store and
//!   the engine's scene graph, in both directions, without feedback loops
//! - [`relay::EventRelay`] forwards engine interaction notifications to the
//!   host through an explicit attach/detach state machine
//! - [`view::DiagramView`] owns the engine instance and coordinates the
//!   whole lifecycle from construction to teardown

pub mod adapter;
pub mod relay;
pub mod view;

pub use adapter::BindingAdapter;
pub use relay::{EventRelay, RelayState};
pub use view::DiagramView;
