// ABOUTME: Parsing of step environment files and merging of image environment.
// ABOUTME: Supports KEY=value lines and KEY<<DELIM heredoc blocks.

use std::collections::HashMap;

/// Malformed environment file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvFileError {
    #[error("invalid format delimiter '{0}' not found before end of file")]
    MissingDelimiter(String),

    #[error("invalid format '{0}', expected a line with '=' or '<<'")]
    InvalidLine(String),
}

/// Parse `content` into `env`, overwriting existing keys.
///
/// Whichever of `=` and `<<` appears first on a line decides its form.
/// Blank lines are ignored and a leading BOM is stripped.
pub fn parse_env_file(content: &str, env: &mut HashMap<String, String>) -> Result<(), EnvFileError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let single = line.find('=');
        let multi = line.find("<<");

        match (single, multi) {
            (Some(eq), m) if m.is_none_or(|m| eq < m) => {
                env.insert(line[..eq].to_string(), line[eq + 1..].to_string());
            }
            (_, Some(m)) => {
                let delimiter = &line[m + 2..];
                let mut value: Vec<&str> = Vec::new();
                let mut found = false;
                for content in lines.by_ref() {
                    if content == delimiter {
                        found = true;
                        break;
                    }
                    value.push(content);
                }
                if !found {
                    return Err(EnvFileError::MissingDelimiter(delimiter.to_string()));
                }
                env.insert(line[..m].to_string(), value.join("\n"));
            }
            _ if line.trim().is_empty() => {}
            _ => return Err(EnvFileError::InvalidLine(line.to_string())),
        }
    }

    Ok(())
}

/// Merge an image's `KEY=value` environment into `env`.
///
/// Existing keys win, except `PATH`, which gets the image value appended.
pub fn merge_image_env(image_env: &[String], env: &mut HashMap<String, String>) {
    for entry in image_env {
        let Some((key, value)) = entry.split_once('=') else {
            continue;
        };
        if key == "PATH" {
            match env.get_mut(key) {
                Some(existing) if !existing.is_empty() => {
                    existing.push(':');
                    existing.push_str(value);
                }
                _ => {
                    env.insert(key.to_string(), value.to_string());
                }
            }
        } else {
            env.entry(key.to_string()).or_insert_with(|| value.to_string());
        }
    }
}
