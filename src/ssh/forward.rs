// ABOUTME: Local Unix socket forwarder over an SSH streamlocal channel.
// ABOUTME: Each accepted connection is piped to the remote runtime socket.

use super::client::TunnelHandler;
use super::error::{Error, Result};
use russh::ChannelMsg;
use russh::client::Handle;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running forwarder. The local socket file is removed on stop or drop.
pub struct ForwardHandle {
    pub local_path: PathBuf,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ForwardHandle {
    /// Stop accepting connections and wait briefly for the accept loop.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), task).await;
        }
        let _ = std::fs::remove_file(&self.local_path);
    }
}

impl Drop for ForwardHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        let _ = std::fs::remove_file(&self.local_path);
    }
}

/// Bind a fresh local socket and forward it to `remote_socket`.
pub(crate) fn start_forward(
    handle: Arc<Handle<TunnelHandler>>,
    remote_socket: String,
) -> Result<ForwardHandle> {
    let local_path = local_socket_path();
    let _ = std::fs::remove_file(&local_path);

    let listener = UnixListener::bind(&local_path).map_err(|e| {
        Error::SocketForwardFailed(format!("failed to bind {}: {}", local_path.display(), e))
    })?;

    let cancel = CancellationToken::new();
    let task = tokio::spawn(accept_loop(listener, handle, remote_socket, cancel.clone()));

    Ok(ForwardHandle {
        local_path,
        cancel,
        task: Some(task),
    })
}

fn local_socket_path() -> PathBuf {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("act-container-{}-{}.sock", std::process::id(), n))
}

async fn accept_loop(
    listener: UnixListener,
    handle: Arc<Handle<TunnelHandler>>,
    remote_socket: String,
    cancel: CancellationToken,
) {
    loop {
        let stream = tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::warn!("accept failed on forwarded socket: {}", e);
                    break;
                }
            },
        };

        let handle = Arc::clone(&handle);
        let remote_socket = remote_socket.clone();
        let cancel = cancel.child_token();
        tokio::spawn(async move {
            if let Err(e) = pipe(stream, &handle, &remote_socket, cancel).await {
                tracing::debug!("forwarded connection ended: {}", e);
            }
        });
    }
}

async fn pipe(
    mut local: UnixStream,
    handle: &Handle<TunnelHandler>,
    remote_socket: &str,
    cancel: CancellationToken,
) -> Result<()> {
    let mut channel = handle
        .channel_open_direct_streamlocal(remote_socket)
        .await
        .map_err(|e| {
            Error::SocketForwardFailed(format!("streamlocal channel to {}: {}", remote_socket, e))
        })?;

    let mut local_done = false;
    let mut remote_done = false;
    let mut buf = vec![0u8; 64 * 1024];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            read = local.read(&mut buf), if !local_done => match read? {
                0 => {
                    local_done = true;
                    let _ = channel.eof().await;
                }
                n => channel.data(&buf[..n]).await.map_err(Error::Protocol)?,
            },

            msg = channel.wait(), if !remote_done => match msg {
                Some(ChannelMsg::Data { ref data }) => local.write_all(data).await?,
                Some(ChannelMsg::Eof) => {
                    remote_done = true;
                    if local_done {
                        break;
                    }
                }
                Some(ChannelMsg::Close) | None => break,
                Some(_) => {}
            },

            else => break,
        }
    }

    Ok(())
}
