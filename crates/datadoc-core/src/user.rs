//! Resolve the identity of the user documenting a dataset.
//!
//! The hosting platform determines where the identity comes from: on Dapla
//! Lab it is the email claim of the injected OIDC token, on legacy
//! JupyterHub it is the `JUPYTERHUB_USER` variable. When neither applies a
//! placeholder is recorded rather than failing the save.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use crate::config::Config;

/// Recorded when no platform identity can be resolved
pub const PLACEHOLDER_USER: &str = "default_user@ssb.no";

#[derive(Debug, Deserialize)]
struct JwtPayload {
    email: Option<String>,
}

/// Resolve the current user's identity from the platform environment.
pub fn get_user_name(config: &Config) -> String {
    if config.dapla_region.as_deref() == Some("DAPLA_LAB") {
        if let Some(email) = config
            .oidc_token
            .as_deref()
            .and_then(email_from_oidc_token)
        {
            return email;
        }
        tracing::warn!("could not resolve user identity from OIDC token, using placeholder");
        return PLACEHOLDER_USER.to_string();
    }
    if config.dapla_service.as_deref() == Some("JUPYTERLAB") {
        if let Some(user) = config.jupyterhub_user.clone() {
            return user;
        }
        tracing::warn!("JUPYTERHUB_USER is not set, using placeholder");
    }
    PLACEHOLDER_USER.to_string()
}

/// Extract the email claim from a JWT without verifying the signature.
///
/// The token is injected by the platform and only used to label who edited
/// the metadata, so no trust decision hangs on it.
fn email_from_oidc_token(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let decoded = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let payload: JwtPayload = serde_json::from_slice(&decoded).ok()?;
    payload.email
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn token_with_payload(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_dapla_lab_resolves_email_from_token() {
        let config = Config {
            dapla_region: Some("DAPLA_LAB".to_string()),
            oidc_token: Some(token_with_payload(
                serde_json::json!({"email": "ano@ssb.no", "aud": "datadoc"}),
            )),
            ..Default::default()
        };
        assert_eq!(get_user_name(&config), "ano@ssb.no");
    }

    #[test]
    fn test_dapla_lab_with_bad_token_falls_back_to_placeholder() {
        let config = Config {
            dapla_region: Some("DAPLA_LAB".to_string()),
            oidc_token: Some("not-a-jwt".to_string()),
            ..Default::default()
        };
        assert_eq!(get_user_name(&config), PLACEHOLDER_USER);
    }

    #[test]
    fn test_jupyterlab_uses_jupyterhub_user() {
        let config = Config {
            dapla_service: Some("JUPYTERLAB".to_string()),
            jupyterhub_user: Some("ano".to_string()),
            ..Default::default()
        };
        assert_eq!(get_user_name(&config), "ano");
    }

    #[test]
    fn test_unknown_platform_uses_placeholder() {
        assert_eq!(get_user_name(&Config::default()), PLACEHOLDER_USER);
    }
}
