// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Accepts runtime names case-insensitively, including `auto`.

use serde::Deserialize;

use crate::runtime::RuntimeType;

pub fn deserialize_runtime<'de, D>(deserializer: D) -> Result<RuntimeType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

pub fn deserialize_socket<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}
