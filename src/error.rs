use std::path::PathBuf;
use thiserror::Error;

/// Startup configuration failures. All of these are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the '{env_var}' environment variable is not set")]
    MissingEnvVar { env_var: String },

    #[error("failed to read {kind} file '{}': {source}", path.display())]
    ReadPem {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no LLM configuration matches tag '{0}'")]
    NoMatchingBackend(String),

    #[error(transparent)]
    Settings(#[from] config::ConfigError),
}

/// Failures while binding a tool to a caller/executor pair.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid tool name '{0}': must match ^[a-zA-Z0-9_-]{{1,64}}$")]
    InvalidName(String),

    #[error("tool '{0}' has no description")]
    MissingDescription(String),

    #[error("tool '{tool}' is already registered with '{agent}'")]
    Duplicate { tool: String, agent: String },

    #[error("cannot register tool '{tool}' for LLM use: agent '{agent}' has no LLM config")]
    CallerWithoutLlm { tool: String, agent: String },
}

/// Failures talking to the upstream chat completion endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream API error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Failures inside a tool invocation. These are reported back to the model.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error("failed to build document: {0}")]
    Document(#[from] DocumentError),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("text contains a character that is not allowed in XML: {0:?}")]
    InvalidCharacter(char),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of a chat exchange between two agents.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("agent '{agent}': {source}")]
    Llm {
        agent: String,
        #[source]
        source: LlmError,
    },

    #[error("invalid chat request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_env_var_names_the_variable() {
        let err = ConfigError::MissingEnvVar {
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "the 'OPENAI_API_KEY' environment variable is not set"
        );
    }

    #[test]
    fn invalid_name_message_escapes_braces() {
        let err = RegistrationError::InvalidName("memo maker".to_string());
        assert!(err.to_string().contains("{1,64}"));
    }
}
