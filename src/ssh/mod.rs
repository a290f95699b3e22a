// ABOUTME: SSH tunnelling for runtimes addressed with ssh:// URIs.
// ABOUTME: Forwards a remote Docker/Podman socket to a local Unix socket.

mod client;
mod error;
mod forward;
mod target;

pub use client::SshTunnel;
pub use error::{Error, Result};
pub use forward::ForwardHandle;
pub use target::SshTarget;
