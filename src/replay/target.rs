use super::model::{EnvironmentConfig, EnvironmentMapping, ReplayTarget};
use crate::common::error::ReplayError;
use std::collections::HashMap;

/// URL and extra headers a replay target resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub url: String,
    /// Environment headers, applied over the captured ones
    pub headers: HashMap<String, String>,
}

/// Split a URL into its `scheme://authority` prefix and the remainder
/// (path, query and fragment, untouched).
fn split_authority(url: &str) -> Option<(&str, &str)> {
    let authority_start = url.find("://")? + 3;
    let rest_start = url[authority_start..]
        .find(['/', '?', '#'])
        .map(|i| authority_start + i)
        .unwrap_or(url.len());
    Some((&url[..rest_start], &url[rest_start..]))
}

fn lookup_environment<'a>(
    name: &str,
    environments: &'a EnvironmentMapping,
) -> Result<&'a EnvironmentConfig, ReplayError> {
    let env = environments
        .get(name)
        .ok_or_else(|| ReplayError::UnknownEnvironment(name.to_string()))?;

    if url::Url::parse(&env.base_url).is_err() {
        return Err(ReplayError::InvalidBaseUrl {
            name: name.to_string(),
            url: env.base_url.clone(),
        });
    }
    Ok(env)
}

/// Check that a target can be resolved without looking at any request
pub fn validate_target(
    target: &ReplayTarget,
    environments: &EnvironmentMapping,
    custom_url: Option<&str>,
) -> Result<(), ReplayError> {
    match target {
        ReplayTarget::Original => Ok(()),
        ReplayTarget::NamedEnvironment(name) => lookup_environment(name, environments).map(|_| ()),
        ReplayTarget::Custom(url) => {
            if custom_url.unwrap_or(url).is_empty() {
                Err(ReplayError::MissingCustomUrl)
            } else {
                Ok(())
            }
        }
    }
}

/// Map a captured URL onto a replay target.
///
/// A named environment swaps only the scheme and authority for its base URL;
/// path, query and fragment are kept byte for byte. A custom URL replaces the
/// captured one outright.
pub fn resolve_target(
    captured_url: &str,
    target: &ReplayTarget,
    environments: &EnvironmentMapping,
    custom_url: Option<&str>,
) -> Result<ResolvedTarget, ReplayError> {
    match target {
        ReplayTarget::Original => Ok(ResolvedTarget {
            url: captured_url.to_string(),
            headers: HashMap::new(),
        }),
        ReplayTarget::NamedEnvironment(name) => {
            let env = lookup_environment(name, environments)?;

            if url::Url::parse(captured_url).is_err() {
                return Err(ReplayError::InvalidUrl(captured_url.to_string()));
            }
            let (_, rest) = split_authority(captured_url)
                .ok_or_else(|| ReplayError::InvalidUrl(captured_url.to_string()))?;

            Ok(ResolvedTarget {
                url: format!("{}{}", env.base_url.trim_end_matches('/'), rest),
                headers: env.headers.clone().unwrap_or_default(),
            })
        }
        ReplayTarget::Custom(url) => {
            let url = custom_url.unwrap_or(url);
            if url.is_empty() {
                return Err(ReplayError::MissingCustomUrl);
            }
            Ok(ResolvedTarget {
                url: url.to_string(),
                headers: HashMap::new(),
            })
        }
    }
}
