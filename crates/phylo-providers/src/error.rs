//! Errores de los backends. Todos son fatales para el stage que los produce.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error calling {endpoint}: {message}")]
    Http { endpoint: String, message: String },
    #[error("api error {status} from {endpoint}: {body}")]
    Api { endpoint: String, status: u16, body: String },
    #[error("unexpected response from {endpoint}: {message}")]
    UnexpectedResponse { endpoint: String, message: String },
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to launch {tool}: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed { tool: String, status: String, stderr: String },
    #[error("{tool} did not produce {}", path.display())]
    MissingOutput { tool: String, path: PathBuf },
    #[error("{backend} backend cannot use artifact handle {handle}")]
    UnsupportedHandle { backend: &'static str, handle: String },
}

impl ProviderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProviderError::Io { path: path.into(), source }
    }

    pub(crate) fn unexpected(endpoint: &str, message: impl Into<String>) -> Self {
        ProviderError::UnexpectedResponse { endpoint: endpoint.to_string(),
                                            message: message.into() }
    }

    /// Traduce un error de `ureq` a la variante correspondiente.
    pub(crate) fn from_ureq(endpoint: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, resp) => {
                let body = resp.into_string().unwrap_or_default();
                ProviderError::Api { endpoint: endpoint.to_string(),
                                     status,
                                     body }
            }
            ureq::Error::Transport(t) => ProviderError::Http { endpoint: endpoint.to_string(),
                                                               message: t.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failed_message_carries_stderr() {
        let e = ProviderError::ToolFailed { tool: "mafft".into(),
                                            status: "exit status: 1".into(),
                                            stderr: "no sequences".into() };
        assert_eq!(e.to_string(), "mafft exited with exit status: 1: no sequences");
    }
}
