use super::types::ApiSpec;
use anyhow::Context;
use std::path::Path;

/// Serialization of a specification document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

impl SpecFormat {
    /// `.yaml` / `.yml` are YAML, everything else is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                SpecFormat::Yaml
            }
            _ => SpecFormat::Json,
        }
    }
}

/// Parse a specification document into a JSON value.
pub fn parse_document(content: &str, format: SpecFormat) -> anyhow::Result<serde_json::Value> {
    let value = match format {
        SpecFormat::Yaml => {
            serde_yaml::from_str(content).context("failed to parse YAML specification")?
        }
        SpecFormat::Json => {
            serde_json::from_str(content).context("failed to parse JSON specification")?
        }
    };
    Ok(value)
}

/// Parse a specification document and extract its path table.
pub fn parse_spec_str(content: &str, format: SpecFormat) -> anyhow::Result<ApiSpec> {
    let document = parse_document(content, format)?;
    let spec = ApiSpec::from_value(&document)?;
    Ok(spec)
}

/// Load a specification file (YAML or JSON, by extension).
pub fn load_spec(file_path: impl AsRef<Path>) -> anyhow::Result<ApiSpec> {
    let file_path = file_path.as_ref();
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read specification {}", file_path.display()))?;
    parse_spec_str(&content, SpecFormat::from_path(file_path))
        .with_context(|| format!("invalid specification {}", file_path.display()))
}
