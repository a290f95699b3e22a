// ABOUTME: Parsing of ssh:// runtime host URIs.
// ABOUTME: Handles ssh://[user@]host[:port][/remote/socket/path].

use super::error::{Error, Result};

/// A remote runtime reachable over SSH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: String,
    pub host: String,
    pub port: u16,
    /// Remote socket path from the URI, if one was given.
    pub socket_path: Option<String>,
}

impl SshTarget {
    /// Parse an `ssh://` URI.
    ///
    /// The user defaults to `$USER`, the port to 22.
    pub fn parse(uri: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let rest = uri
            .trim()
            .strip_prefix("ssh://")
            .ok_or_else(|| invalid("scheme must be ssh://"))?;
        // Query parameters such as `?secure=true` are not part of the socket path.
        let rest = rest.split_once('?').map_or(rest, |(head, _)| head);

        let (authority, path) = match rest.find('/') {
            Some(slash) => (&rest[..slash], Some(&rest[slash..])),
            None => (rest, None),
        };

        let (user, host_port) = match authority.rsplit_once('@') {
            Some((user, host_port)) if !user.is_empty() => (Some(user), host_port),
            Some(_) => return Err(invalid("empty user")),
            None => (None, authority),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| invalid(&format!("invalid port: {}", port)))?;
                (host, port)
            }
            None => (host_port, 22),
        };

        if host.is_empty() {
            return Err(invalid("hostname cannot be empty"));
        }

        let user = match user {
            Some(user) => user.to_string(),
            None => std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .map_err(|_| invalid("no user in URI and $USER is not set"))?,
        };

        Ok(Self {
            user,
            host: host.to_string(),
            port,
            socket_path: path.filter(|p| p.len() > 1).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_uri() {
        let target = SshTarget::parse("ssh://core@build.example.com:2222/run/user/1000/podman/podman.sock")
            .unwrap();
        assert_eq!(target.user, "core");
        assert_eq!(target.host, "build.example.com");
        assert_eq!(target.port, 2222);
        assert_eq!(
            target.socket_path.as_deref(),
            Some("/run/user/1000/podman/podman.sock")
        );
    }

    #[test]
    fn port_and_path_are_optional() {
        let target = SshTarget::parse("ssh://deploy@10.0.0.5").unwrap();
        assert_eq!(target.port, 22);
        assert_eq!(target.socket_path, None);

        let target = SshTarget::parse("ssh://deploy@10.0.0.5/").unwrap();
        assert_eq!(target.socket_path, None);
    }

    #[test]
    fn query_is_not_part_of_socket_path() {
        let target =
            SshTarget::parse("ssh://core@127.0.0.1:50915/run/user/501/podman/podman.sock?secure=true")
                .unwrap();
        assert_eq!(target.port, 50915);
        assert_eq!(
            target.socket_path.as_deref(),
            Some("/run/user/501/podman/podman.sock")
        );

        let target = SshTarget::parse("ssh://core@127.0.0.1:50915?secure=true").unwrap();
        assert_eq!(target.port, 50915);
        assert_eq!(target.socket_path, None);
    }

    #[test]
    fn rejects_other_schemes_and_bad_ports() {
        assert!(SshTarget::parse("tcp://host:2375").is_err());
        assert!(SshTarget::parse("ssh://me@host:notaport").is_err());
        assert!(SshTarget::parse("ssh://me@").is_err());
    }
}
