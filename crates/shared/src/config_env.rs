use crate::config::ConfigError;

pub(crate) type EnvLookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

pub(crate) fn optional_trimmed_env(lookup: &EnvLookup<'_>, key: &str) -> Option<String> {
    lookup(key).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub(crate) fn parse_u32_env(
    lookup: &EnvLookup<'_>,
    key: &str,
    default: u32,
) -> Result<u32, ConfigError> {
    match optional_trimmed_env(lookup, key) {
        Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::ParseInt {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_u64_env(
    lookup: &EnvLookup<'_>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    match optional_trimmed_env(lookup, key) {
        Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::ParseInt {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_http_url_env(
    lookup: &EnvLookup<'_>,
    key: &str,
    default: &str,
) -> Result<String, ConfigError> {
    let raw = optional_trimmed_env(lookup, key).unwrap_or_else(|| default.to_string());
    let parsed = url::Url::parse(&raw).map_err(|err| {
        ConfigError::InvalidConfiguration(format!("{key} is not a valid url: {err}"))
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidConfiguration(format!(
            "{key} must start with http:// or https://"
        )));
    }

    Ok(raw)
}
