use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::{Client, Identity};
use tracing::{debug, warn};

use crate::error::ConfigError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const CAMOGPT_API_KEY: &str = "CAMOGPT_API_KEY";
pub const CAMOGPT_CERT_FILE: &str = "CAMOGPT_CERT_FILE";
pub const CAMOGPT_KEY_FILE: &str = "CAMOGPT_KEY_FILE";

pub const CAMOGPT_TAG: &str = "camogpt";
pub const CAMOGPT_BASE_URL: &str = "https://omni.army.mil/camogptapi/v2";
pub const OPENAI_MODEL: &str = "gpt-4o";

/// Filtered configuration record for one LLM backend.
#[derive(Clone)]
pub struct LLMConfig {
    pub tags: BTreeSet<String>,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    /// Custom transport; only the internal backend sets one.
    pub http_client: Option<Client>,
    pub cache_seed: Option<u64>,
    /// Requests per second.
    pub api_rate_limit: Option<f64>,
}

impl LLMConfig {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LLMConfig")
            .field("tags", &self.tags)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("http_client", &self.http_client.is_some())
            .field("cache_seed", &self.cache_seed)
            .field("api_rate_limit", &self.api_rate_limit)
            .finish()
    }
}

/// Credentials required by each backend, read from the process environment.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendSettings {
    OpenAi {
        api_key: String,
    },
    CamoGpt {
        api_key: String,
        cert_file: PathBuf,
        key_file: PathBuf,
    },
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSettings::OpenAi { .. } => f.write_str("OpenAi { .. }"),
            BackendSettings::CamoGpt {
                cert_file,
                key_file,
                ..
            } => f
                .debug_struct("CamoGpt")
                .field("cert_file", cert_file)
                .field("key_file", key_file)
                .finish_non_exhaustive(),
        }
    }
}

impl BackendSettings {
    /// Pick the variant for `llm_tag` and check its variables are present.
    /// Any tag other than "camogpt" uses the OpenAI credential.
    pub fn from_env<F>(llm_tag: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if llm_tag == CAMOGPT_TAG {
            Ok(BackendSettings::CamoGpt {
                api_key: require(&env, CAMOGPT_API_KEY)?,
                cert_file: require(&env, CAMOGPT_CERT_FILE)?.into(),
                key_file: require(&env, CAMOGPT_KEY_FILE)?.into(),
            })
        } else {
            Ok(BackendSettings::OpenAi {
                api_key: require(&env, OPENAI_API_KEY)?,
            })
        }
    }

    /// Candidate records in declaration order.
    pub fn into_configs(self) -> Result<Vec<LLMConfig>, ConfigError> {
        match self {
            BackendSettings::CamoGpt {
                api_key,
                cert_file,
                key_file,
            } => Ok(vec![LLMConfig {
                tags: tags(&[CAMOGPT_TAG]),
                model: String::new(),
                api_key,
                base_url: Some(CAMOGPT_BASE_URL.to_string()),
                http_client: Some(build_http_client(&cert_file, &key_file)?),
                cache_seed: None,
                api_rate_limit: Some(1.0),
            }]),
            BackendSettings::OpenAi { api_key } => Ok(vec![LLMConfig {
                tags: tags(&["openai", OPENAI_MODEL]),
                model: OPENAI_MODEL.to_string(),
                api_key,
                base_url: None,
                http_client: None,
                cache_seed: None,
                api_rate_limit: None,
            }]),
        }
    }
}

fn require<F>(env: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(name) {
        Some(value) => {
            debug!("the '{}' environment variable is set", name);
            Ok(value)
        }
        None => Err(ConfigError::MissingEnvVar {
            env_var: name.to_string(),
        }),
    }
}

fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Client bound to a certificate/key pair. Server certificate verification
/// is disabled for the internal CA.
fn build_http_client(cert_file: &Path, key_file: &Path) -> Result<Client, ConfigError> {
    let cert = read_pem("certificate", cert_file)?;
    let key = read_pem("private key", key_file)?;
    let identity = Identity::from_pkcs8_pem(&cert, &key)?;

    warn!("TLS certificate verification is disabled for the CamoGPT HTTP client");
    Ok(Client::builder()
        .identity(identity)
        .danger_accept_invalid_certs(true)
        .build()?)
}

fn read_pem(kind: &'static str, path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|source| ConfigError::ReadPem {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// First record whose tags contain `llm_tag`.
pub fn filter_config(llm_tag: &str, configs: Vec<LLMConfig>) -> Result<LLMConfig, ConfigError> {
    let mut matches = configs.into_iter().filter(|c| c.has_tag(llm_tag));
    let selected = matches
        .next()
        .ok_or_else(|| ConfigError::NoMatchingBackend(llm_tag.to_string()))?;

    let extra = matches.count();
    if extra > 0 {
        warn!(
            "{} more LLM configs also match tag '{}'; using the first",
            extra, llm_tag
        );
    }
    Ok(selected)
}

/// Resolve the LLM config for `llm_tag` from the process environment.
pub fn resolve_llm_config(llm_tag: &str) -> Result<LLMConfig, ConfigError> {
    resolve_llm_config_with(llm_tag, |name| std::env::var(name).ok())
}

pub fn resolve_llm_config_with<F>(llm_tag: &str, env: F) -> Result<LLMConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let settings = BackendSettings::from_env(llm_tag, env)?;
    filter_config(llm_tag, settings.into_configs()?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn fixture(name: &str) -> String {
        format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    pub fn openai_config() -> LLMConfig {
        resolve_llm_config_with("openai", |name| {
            (name == OPENAI_API_KEY).then(|| "sk-test".to_string())
        })
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::fixture;
    use super::*;
    use crate::logging::test_support::capture_logs;
    use serial_test::serial;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn camogpt_env() -> impl Fn(&str) -> Option<String> {
        env_from(&[
            (CAMOGPT_API_KEY, "camo-key".to_string()),
            (CAMOGPT_CERT_FILE, fixture("client.crt")),
            (CAMOGPT_KEY_FILE, fixture("client.key")),
        ])
    }

    #[test]
    fn openai_tag_resolves_without_transport() {
        let config =
            resolve_llm_config_with("openai", env_from(&[(OPENAI_API_KEY, "sk-1".into())]))
                .unwrap();
        assert!(config.has_tag("openai"));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.api_key, "sk-1");
        assert!(config.http_client.is_none());
        assert!(config.base_url.is_none());
        assert!(config.api_rate_limit.is_none());
        assert!(config.cache_seed.is_none());
    }

    #[test]
    fn model_tag_selects_the_openai_record() {
        let config =
            resolve_llm_config_with("gpt-4o", env_from(&[(OPENAI_API_KEY, "sk-1".into())]))
                .unwrap();
        assert!(config.has_tag("gpt-4o"));
        assert!(config.http_client.is_none());
    }

    #[test]
    fn camogpt_tag_builds_certificate_transport() {
        let config = resolve_llm_config_with("camogpt", camogpt_env()).unwrap();
        assert!(config.has_tag("camogpt"));
        assert!(config.http_client.is_some());
        assert_eq!(config.base_url.as_deref(), Some(CAMOGPT_BASE_URL));
        assert_eq!(config.api_rate_limit, Some(1.0));
        assert_eq!(config.api_key, "camo-key");
    }

    #[test]
    fn missing_credential_names_the_variable() {
        let err = resolve_llm_config_with("openai", env_from(&[])).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingEnvVar { ref env_var } if env_var == OPENAI_API_KEY)
        );

        let err = resolve_llm_config_with("camogpt", env_from(&[])).unwrap_err();
        assert!(err.to_string().contains(CAMOGPT_API_KEY));
    }

    #[test]
    fn camogpt_requires_certificate_paths() {
        let env = env_from(&[(CAMOGPT_API_KEY, "camo-key".into())]);
        let err = resolve_llm_config_with("camogpt", env).unwrap_err();
        assert!(err.to_string().contains(CAMOGPT_CERT_FILE));
    }

    #[test]
    fn unreadable_certificate_is_a_config_error() {
        let env = env_from(&[
            (CAMOGPT_API_KEY, "camo-key".into()),
            (CAMOGPT_CERT_FILE, "/nonexistent/client.crt".into()),
            (CAMOGPT_KEY_FILE, fixture("client.key")),
        ]);
        let err = resolve_llm_config_with("camogpt", env).unwrap_err();
        assert!(matches!(err, ConfigError::ReadPem { kind: "certificate", .. }));
    }

    #[test]
    fn unknown_tag_matches_nothing() {
        let err = resolve_llm_config_with("mistral", env_from(&[(OPENAI_API_KEY, "k".into())]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoMatchingBackend(ref t) if t == "mistral"));
    }

    #[test]
    fn credential_value_is_never_logged() {
        let (_, lines) = capture_logs(|| {
            resolve_llm_config_with("openai", env_from(&[(OPENAI_API_KEY, "sk-secret".into())]))
                .unwrap()
        });
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "DEBUG");
        assert_eq!(
            lines[0]["message"],
            "the 'OPENAI_API_KEY' environment variable is set"
        );
        assert!(!lines[0].to_string().contains("sk-secret"));
    }

    #[test]
    fn ambiguous_match_takes_first_and_warns() {
        let first = super::test_support::openai_config();
        let mut second = first.clone();
        second.model = "gpt-4o-mini".to_string();

        let (selected, lines) = capture_logs(|| filter_config("openai", vec![first, second]));
        assert_eq!(selected.unwrap().model, "gpt-4o");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "WARN");
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let config = super::test_support::openai_config();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-test"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn resolves_from_process_environment() {
        std::env::set_var(OPENAI_API_KEY, "sk-env");
        let config = resolve_llm_config("openai").unwrap();
        std::env::remove_var(OPENAI_API_KEY);
        assert_eq!(config.api_key, "sk-env");

        let err = resolve_llm_config("openai").unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY));
    }
}
