use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use generate::GenerationConfig;
use index::RetrievalConfig;
use ingest::ChunkerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub corpus_path: PathBuf,
    pub retrieval: RetrievalConfig,
    pub openai: OpenAiConfig,
    pub generation: GenerationConfig,
    pub output: OutputConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub embedding_model: String,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub retention: RetentionPolicy,
    pub download_filename: String,
}

/// What happens to rendered files once they have been served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Keep,
    DeleteAfterSend,
    MaxAge(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for RetentionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "keep" => Ok(RetentionPolicy::Keep),
            "delete-after-send" => Ok(RetentionPolicy::DeleteAfterSend),
            other => match other.strip_prefix("max-age:") {
                Some(secs) => match secs.trim().parse::<u64>() {
                    // A zero age would sweep documents still being served
                    Ok(0) => Err("max-age must be at least one second".to_string()),
                    Ok(secs) => Ok(RetentionPolicy::MaxAge(Duration::from_secs(secs))),
                    Err(e) => Err(format!("max-age seconds: {e}")),
                },
                None => Err("expected keep, delete-after-send or max-age:<seconds>".to_string()),
            },
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected text or json".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            corpus_path: PathBuf::from("data/rag_knowledge.txt"),
            retrieval: RetrievalConfig::default(),
            openai: OpenAiConfig {
                base_url: index::embeddings::DEFAULT_BASE_URL.to_string(),
                api_key: None,
                embedding_model: index::embeddings::DEFAULT_MODEL.to_string(),
            },
            generation: GenerationConfig::default(),
            output: OutputConfig {
                dir: PathBuf::from("output"),
                retention: RetentionPolicy::Keep,
                download_filename: "tech_spec_down.docx".to_string(),
            },
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the config from a variable lookup; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let chunker = ChunkerConfig {
            chunk_size: parse_var(&lookup, "SPECGEN_CHUNK_SIZE", defaults.retrieval.chunker.chunk_size)?,
            chunk_overlap: parse_var(
                &lookup,
                "SPECGEN_CHUNK_OVERLAP",
                defaults.retrieval.chunker.chunk_overlap,
            )?,
        };
        chunker.validate().map_err(|e| ConfigError::Invalid {
            var: "SPECGEN_CHUNK_OVERLAP",
            value: chunker.chunk_overlap.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            bind_addr: lookup("SPECGEN_BIND_ADDR").unwrap_or(defaults.bind_addr),
            corpus_path: lookup("SPECGEN_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.corpus_path),
            retrieval: RetrievalConfig {
                chunker,
                top_k: parse_var(&lookup, "SPECGEN_TOP_K", defaults.retrieval.top_k)?,
            },
            openai: OpenAiConfig {
                base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.openai.base_url),
                api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
                embedding_model: lookup("SPECGEN_EMBEDDING_MODEL")
                    .unwrap_or(defaults.openai.embedding_model),
            },
            generation: GenerationConfig {
                model: lookup("SPECGEN_CHAT_MODEL").unwrap_or(defaults.generation.model),
                temperature: parse_var(
                    &lookup,
                    "SPECGEN_TEMPERATURE",
                    defaults.generation.temperature,
                )?,
            },
            output: OutputConfig {
                dir: lookup("SPECGEN_OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.output.dir),
                retention: parse_var(&lookup, "SPECGEN_RETENTION", defaults.output.retention)?,
                download_filename: defaults.output.download_filename,
            },
            log_format: parse_var(&lookup, "SPECGEN_LOG_FORMAT", defaults.log_format)?,
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(var) {
        Some(value) => {
            let parsed: Result<T, T::Err> = value.trim().parse();
            parsed.map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            })
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_match_pipeline_parameters() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.retrieval.chunker.chunk_size, 2000);
        assert_eq!(config.retrieval.chunker.chunk_overlap, 100);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.generation.model, "gpt-4.1");
        assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.output.retention, RetentionPolicy::Keep);
        assert_eq!(config.output.download_filename, "tech_spec_down.docx");
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("SPECGEN_TOP_K", "3"),
            ("SPECGEN_CHUNK_SIZE", "500"),
            ("SPECGEN_CHUNK_OVERLAP", "50"),
            ("SPECGEN_RETENTION", "max-age:3600"),
            ("SPECGEN_LOG_FORMAT", "JSON"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SPECGEN_OUTPUT_DIR", "/tmp/specs"),
        ])
        .unwrap();

        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.chunker.chunk_size, 500);
        assert_eq!(
            config.output.retention,
            RetentionPolicy::MaxAge(Duration::from_secs(3600))
        );
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.output.dir, PathBuf::from("/tmp/specs"));
    }

    #[test]
    fn unparseable_number_names_the_variable() {
        let err = config_from(&[("SPECGEN_TOP_K", "five")]).unwrap_err();
        assert!(err.to_string().contains("SPECGEN_TOP_K"));
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let err = config_from(&[("SPECGEN_CHUNK_SIZE", "100"), ("SPECGEN_CHUNK_OVERLAP", "100")])
            .unwrap_err();
        assert!(err.to_string().contains("SPECGEN_CHUNK_OVERLAP"));
    }

    #[test]
    fn retention_policies_parse() {
        assert_eq!("keep".parse::<RetentionPolicy>(), Ok(RetentionPolicy::Keep));
        assert_eq!("delete-after-send".parse::<RetentionPolicy>(), Ok(RetentionPolicy::DeleteAfterSend));
        assert!("max-age:soon".parse::<RetentionPolicy>().is_err());
        assert!("max-age:0".parse::<RetentionPolicy>().is_err());
        assert_eq!(
            "max-age:1".parse::<RetentionPolicy>(),
            Ok(RetentionPolicy::MaxAge(Duration::from_secs(1)))
        );
        assert!("forever".parse::<RetentionPolicy>().is_err());
    }
}
