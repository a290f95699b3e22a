// ABOUTME: Sealed trait pattern for the execution-environment traits.
// ABOUTME: Only the adapters in this crate can implement them.

/// Implemented by the Docker, Podman and null adapters and the `Container` enum.
///
/// Keeping the traits sealed lets new operations be added without breaking
/// downstream code.
pub trait Sealed {}
