// ABOUTME: Typed identifiers for runtime objects.
// ABOUTME: Keeps container and exec IDs from being mixed up.

mod id;

pub use id::{ContainerId, ExecId, Id};
