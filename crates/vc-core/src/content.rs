//! Payload sources for the initiating side of an echo exchange

use std::path::PathBuf;

use bytes::Bytes;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Text repeated by the default pattern payload
pub const DEFAULT_PATTERN: &str = "hello world";

/// Default payload size (64 KiB)
pub const DEFAULT_CONTENT_SIZE: usize = 64 * 1024;

/// Where the initiator's payload comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSource {
    /// `text` repeated until `size` bytes, cut at the boundary
    Pattern { text: String, size: usize },
    /// `size` random bytes
    Random { size: usize },
    /// Contents of a file
    File { path: PathBuf },
}

impl Default for ContentSource {
    fn default() -> Self {
        Self::Pattern {
            text: DEFAULT_PATTERN.to_string(),
            size: DEFAULT_CONTENT_SIZE,
        }
    }
}

impl ContentSource {
    /// Produce the payload bytes
    pub fn generate(&self) -> Result<Bytes, ConfigError> {
        match self {
            ContentSource::Pattern { text, size } => {
                if text.is_empty() && *size > 0 {
                    return Err(ConfigError::Invalid(
                        "pattern text must not be empty".to_string(),
                    ));
                }
                let payload: Vec<u8> = text.bytes().cycle().take(*size).collect();
                Ok(Bytes::from(payload))
            }
            ContentSource::Random { size } => {
                let mut payload = vec![0u8; *size];
                rand::thread_rng().fill_bytes(&mut payload);
                Ok(Bytes::from(payload))
            }
            ContentSource::File { path } => std::fs::read(path)
                .map(Bytes::from)
                .map_err(|e| ConfigError::Invalid(format!("Failed to read {:?}: {}", path, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let payload = ContentSource::default().generate().unwrap();
        assert_eq!(payload.len(), DEFAULT_CONTENT_SIZE);
        assert!(payload.starts_with(b"hello worldhello world"));
    }

    #[test]
    fn test_pattern_cut_at_size() {
        let source = ContentSource::Pattern {
            text: "abc".to_string(),
            size: 7,
        };
        assert_eq!(source.generate().unwrap().as_ref(), b"abcabca");
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let source = ContentSource::Pattern {
            text: String::new(),
            size: 4,
        };
        assert!(source.generate().is_err());
    }

    #[test]
    fn test_random_size() {
        let source = ContentSource::Random { size: 1000 };
        assert_eq!(source.generate().unwrap().len(), 1000);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"from disk").unwrap();

        let source = ContentSource::File { path };
        assert_eq!(source.generate().unwrap().as_ref(), b"from disk");
    }

    #[test]
    fn test_toml_representation() {
        let source: ContentSource = toml::from_str("kind = \"random\"\nsize = 42\n").unwrap();
        assert_eq!(source, ContentSource::Random { size: 42 });
    }
}
