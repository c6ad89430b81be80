//! Provider selection for embedding backends.

use canonry_core::{EmbeddingBackend, Error, Result};

/// Which embedding backend implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Local Ollama instance (default)
    #[default]
    Ollama,
    /// OpenAI-compatible API
    OpenAI,
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::OpenAI => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            other => Err(Error::Config(format!(
                "Invalid embedding provider: {}",
                other
            ))),
        }
    }
}

/// Construct a backend for the given provider from environment variables,
/// optionally overriding the model name.
///
/// Providers compiled out by feature flags produce a configuration error
/// rather than a silent fallback.
pub fn backend_from_env(
    provider: EmbeddingProvider,
    model: Option<String>,
) -> Result<Box<dyn EmbeddingBackend>> {
    match provider {
        EmbeddingProvider::Ollama => {
            #[cfg(feature = "ollama")]
            {
                let mut backend = crate::ollama::OllamaBackend::from_env();
                if let Some(model) = model {
                    backend.set_model(model);
                }
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "ollama"))]
            {
                let _ = model;
                Err(Error::Config(
                    "built without the 'ollama' feature".to_string(),
                ))
            }
        }
        EmbeddingProvider::OpenAI => {
            #[cfg(feature = "openai")]
            {
                let mut backend = crate::openai::OpenAIBackend::from_env()?;
                if let Some(model) = model {
                    backend.set_model(model);
                }
                Ok(Box::new(backend))
            }
            #[cfg(not(feature = "openai"))]
            {
                let _ = model;
                Err(Error::Config(
                    "built without the 'openai' feature".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_display() {
        assert_eq!(EmbeddingProvider::Ollama.to_string(), "ollama");
        assert_eq!(EmbeddingProvider::OpenAI.to_string(), "openai");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(
            "ollama".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::Ollama
        );
        assert_eq!(
            "OPENAI".parse::<EmbeddingProvider>().unwrap(),
            EmbeddingProvider::OpenAI
        );

        let result = "invalid".parse::<EmbeddingProvider>();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid embedding provider"));
    }

    #[test]
    fn test_provider_default() {
        assert_eq!(EmbeddingProvider::default(), EmbeddingProvider::Ollama);
    }
}
