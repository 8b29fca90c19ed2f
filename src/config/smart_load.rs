use figment::providers::{Format, Json, Toml, Yaml};
use std::path::Path;

/// Configuration file loader that chooses the format from the file extension
/// Returns a provider that can be directly used with figment.merge()
pub fn auto<P: AsRef<Path>>(path: P) -> impl figment::Provider {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "json" => SmartProvider::Json(Json::file(path)),
        "yaml" | "yml" => SmartProvider::Yaml(Yaml::file(path)),
        "toml" => SmartProvider::Toml(Toml::file(path)),
        _ => match std::fs::read_to_string(path)
            .ok()
            .and_then(|content| detect_format_from_content(&content))
        {
            Some(ConfigFormat::Json) => SmartProvider::Json(Json::file(path)),
            Some(ConfigFormat::Yaml) => SmartProvider::Yaml(Yaml::file(path)),
            _ => {
                tracing::trace!("Loading {} as TOML", path.display());
                SmartProvider::Toml(Toml::file(path))
            }
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Wrapper enum to handle different provider types
enum SmartProvider {
    Toml(figment::providers::Data<Toml>),
    Json(figment::providers::Data<Json>),
    Yaml(figment::providers::Data<Yaml>),
}

impl figment::Provider for SmartProvider {
    fn metadata(&self) -> figment::Metadata {
        match self {
            SmartProvider::Toml(p) => p.metadata(),
            SmartProvider::Json(p) => p.metadata(),
            SmartProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(
        &self,
    ) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        match self {
            SmartProvider::Toml(p) => p.data(),
            SmartProvider::Json(p) => p.data(),
            SmartProvider::Yaml(p) => p.data(),
        }
    }
}

/// Guess the format of an extensionless config file
fn detect_format_from_content(content: &str) -> Option<ConfigFormat> {
    let trimmed = content.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(ConfigFormat::Json);
    }

    let is_toml_line = |line: &str| {
        (line.starts_with('[') && line.ends_with(']')) || (line.contains('=') && !line.contains(':'))
    };
    let lines = || trimmed.lines().map(str::trim).filter(|l| !l.is_empty() && !l.starts_with('#'));

    if lines().any(is_toml_line) {
        return Some(ConfigFormat::Toml);
    }

    if trimmed.starts_with("---") || lines().any(|line| line.contains(':')) {
        return Some(ConfigFormat::Yaml);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            detect_format_from_content(r#"{"min_file_size_mb": 50}"#),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            detect_format_from_content("min_file_size_mb: 50"),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            detect_format_from_content("[library]\ndelete_files = true"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            detect_format_from_content("# comment\nenabled = false"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(detect_format_from_content(""), None);
    }
}
