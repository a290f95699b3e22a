// ABOUTME: Socket candidate table for runtime auto-detection.
// ABOUTME: Expands path placeholders, filters to live sockets, orders by score.

use super::types::{RuntimeType, SocketCandidate};

/// Conventional socket locations, Podman ranked above Docker.
///
/// New backends are added by appending rows.
pub fn default_candidates() -> Vec<SocketCandidate> {
    vec![
        SocketCandidate::new("$XDG_RUNTIME_DIR/podman/podman.sock", RuntimeType::Podman, 95),
        SocketCandidate::new("/run/podman/podman.sock", RuntimeType::Podman, 90),
        SocketCandidate::new(
            "$HOME/.local/share/containers/podman/machine/podman.sock",
            RuntimeType::Podman,
            85,
        ),
        SocketCandidate::new("/var/run/docker.sock", RuntimeType::Docker, 80),
        SocketCandidate::new("$HOME/.colima/docker.sock", RuntimeType::Docker, 75),
        SocketCandidate::new("$XDG_RUNTIME_DIR/docker.sock", RuntimeType::Docker, 70),
        SocketCandidate::new("$HOME/.docker/run/docker.sock", RuntimeType::Docker, 65),
        SocketCandidate::new(r"\\.\pipe\docker_engine", RuntimeType::Docker, 60),
        SocketCandidate::new(r"\\.\pipe\podman-machine-default", RuntimeType::Podman, 85),
    ]
}

/// Expand `$VAR` and `${VAR}` placeholders using `lookup`.
///
/// Unset variables expand to the empty string. A `$` not followed by a
/// variable name is kept literally.
pub fn expand_placeholders<F>(path: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(path.len());
    let mut chars = path.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let rest = &path[i + 1..];
        let (name, consumed) = if let Some(braced) = rest.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            (&rest[..end], end)
        };

        if name.is_empty() {
            out.push('$');
            continue;
        }

        out.push_str(&lookup(name).unwrap_or_default());
        for _ in 0..consumed {
            chars.next();
        }
    }

    out
}

/// Environment lookup used for candidate paths.
///
/// `HOME` falls back to the platform home directory when unset.
pub fn process_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ if name == "HOME" => dirs::home_dir().map(|p| p.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Whether `path` is an existing socket or named pipe.
///
/// Regular files and directories do not count.
#[cfg(unix)]
pub fn socket_exists(path: &str) -> bool {
    use std::os::unix::fs::FileTypeExt;

    match std::fs::symlink_metadata(path) {
        Ok(meta) => {
            let file_type = meta.file_type();
            if file_type.is_symlink() {
                // Docker Desktop links /var/run/docker.sock into the user's home.
                return std::fs::metadata(path)
                    .map(|m| m.file_type().is_socket() || m.file_type().is_fifo())
                    .unwrap_or(false);
            }
            file_type.is_socket() || file_type.is_fifo()
        }
        Err(_) => false,
    }
}

#[cfg(windows)]
pub fn socket_exists(path: &str) -> bool {
    path.starts_with(r"\\.\pipe\") && std::path::Path::new(path).exists()
}

#[cfg(not(any(unix, windows)))]
pub fn socket_exists(_path: &str) -> bool {
    false
}

/// Expand every candidate and keep the ones that exist, highest score first.
///
/// The sort is stable so equal scores keep table order.
pub fn existing_candidates<F, E>(
    table: &[SocketCandidate],
    lookup: F,
    exists: E,
) -> Vec<SocketCandidate>
where
    F: Fn(&str) -> Option<String>,
    E: Fn(&str) -> bool,
{
    let mut available: Vec<SocketCandidate> = table
        .iter()
        .map(|c| SocketCandidate {
            path: expand_placeholders(&c.path, &lookup),
            runtime: c.runtime,
            score: c.score,
        })
        .filter(|c| !c.path.is_empty() && exists(&c.path))
        .collect();

    available.sort_by_key(|c| std::cmp::Reverse(c.score));
    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn expands_plain_and_braced_placeholders() {
        let env = env_of(&[("HOME", "/home/ci"), ("XDG_RUNTIME_DIR", "/run/user/1000")]);
        assert_eq!(
            expand_placeholders("$HOME/.colima/docker.sock", &env),
            "/home/ci/.colima/docker.sock"
        );
        assert_eq!(
            expand_placeholders("${XDG_RUNTIME_DIR}/podman/podman.sock", &env),
            "/run/user/1000/podman/podman.sock"
        );
    }

    #[test]
    fn unset_placeholders_expand_to_empty() {
        let env = env_of(&[]);
        assert_eq!(
            expand_placeholders("$XDG_RUNTIME_DIR/docker.sock", &env),
            "/docker.sock"
        );
    }

    #[test]
    fn lone_dollar_is_literal() {
        let env = env_of(&[]);
        assert_eq!(expand_placeholders("/tmp/$/x", &env), "/tmp/$/x");
        assert_eq!(expand_placeholders(r"\\.\pipe\docker_engine", &env), r"\\.\pipe\docker_engine");
    }

    #[test]
    fn podman_outranks_docker_in_default_table() {
        let table = default_candidates();
        let best_podman = table
            .iter()
            .filter(|c| c.runtime == RuntimeType::Podman)
            .map(|c| c.score)
            .max();
        let best_docker = table
            .iter()
            .filter(|c| c.runtime == RuntimeType::Docker)
            .map(|c| c.score)
            .max();
        assert!(best_podman > best_docker);
    }

    #[test]
    fn existing_candidates_sorted_by_score_with_stable_ties() {
        let table = vec![
            SocketCandidate::new("/a", RuntimeType::Docker, 10),
            SocketCandidate::new("/b", RuntimeType::Podman, 50),
            SocketCandidate::new("/c", RuntimeType::Docker, 50),
            SocketCandidate::new("/missing", RuntimeType::Podman, 99),
        ];

        let found = existing_candidates(&table, env_of(&[]), |p| p != "/missing");
        let paths: Vec<&str> = found.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["/b", "/c", "/a"]);
    }

    #[cfg(unix)]
    #[test]
    fn regular_file_is_not_a_socket() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("docker.sock");
        std::fs::write(&file, b"").unwrap();
        assert!(!socket_exists(file.to_str().unwrap()));
    }

    #[cfg(unix)]
    #[test]
    fn unix_listener_counts_as_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podman.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&path).unwrap();
        assert!(socket_exists(path.to_str().unwrap()));
    }
}
