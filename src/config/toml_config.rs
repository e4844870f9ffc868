use crate::domain::model::{Layout, Part};
use crate::utils::error::{QscriptError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_regex, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "qscript.toml";

/// Per-study settings, read from `qscript.toml` in the study repo root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub codebook: CodebookConfig,
    pub whowhat: WhoWhatConfig,
    pub compare: CompareConfig,
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodebookConfig {
    pub path: String,
    /// Code that silences the reporting of coding differences
    pub ignore_code: String,
    pub garbage_codes: Vec<String>,
    /// Pseudo-topic for codes that have no topic
    pub none_topic: String,
    /// Code group of each plain code, for coarser analyses
    pub topics: HashMap<String, String>,
}

impl Default for CodebookConfig {
    fn default() -> Self {
        Self {
            path: "codebook.md".to_string(),
            ignore_code: "-ignorediff".to_string(),
            garbage_codes: vec!["cruft".to_string()],
            none_topic: "none".to_string(),
            topics: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pairing {
    /// A/B, A/C, A/D, ...
    #[default]
    WithA,
    /// A/B, C/D, ...
    Neighbors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoWhatConfig {
    pub file: String,
    pub pairing: Pairing,
    /// Prefix of the A/B/... subdirectories; detected from the workdir when absent
    pub subdir_prefix: Option<String>,
}

impl Default for WhoWhatConfig {
    fn default() -> Self {
        Self {
            file: "sample-who-what.txt".to_string(),
            pairing: Pairing::WithA,
            subdir_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub max_count_diff: u32,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { max_count_diff: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub pdftotext: String,
    #[serde(rename = "abstract")]
    pub abstract_layouts: Vec<Layout>,
    #[serde(rename = "conclusion")]
    pub conclusion_layouts: Vec<Layout>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            pdftotext: "pdftotext".to_string(),
            abstract_layouts: Vec::new(),
            conclusion_layouts: Vec::new(),
        }
    }
}

impl ExtractConfig {
    pub fn layouts(&self, part: Part) -> &[Layout] {
        match part {
            Part::Abstract => &self.abstract_layouts,
            Part::Conclusion => &self.conclusion_layouts,
        }
    }

    /// Like `layouts`, but extracting without any layout type is a configuration error.
    pub fn required_layouts(&self, part: Part) -> Result<&[Layout]> {
        let layouts = self.layouts(part);
        if layouts.is_empty() {
            return Err(QscriptError::MissingConfigError {
                field: format!("[[extract.{}]]", part),
            });
        }
        Ok(layouts)
    }
}

impl ProjectConfig {
    /// Load the given file, or `qscript.toml` if present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| QscriptError::file(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| QscriptError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` by the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;
        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        validate_path("codebook.path", &self.codebook.path)?;
        validate_non_empty_string("codebook.ignore_code", &self.codebook.ignore_code)?;
        validate_path("whowhat.file", &self.whowhat.file)?;
        validate_non_empty_string("extract.pdftotext", &self.extract.pdftotext)?;

        for (part, layouts) in [
            ("abstract", &self.extract.abstract_layouts),
            ("conclusion", &self.extract.conclusion_layouts),
        ] {
            for layout in layouts {
                let field = format!("extract.{}.{}", part, layout.name);
                validate_non_empty_string(&format!("{}.name", field), &layout.name)?;
                validate_regex(&format!("{}.start", field), &layout.start)?;
                if let Some(end) = &layout.end {
                    validate_regex(&format!("{}.end", field), end)?;
                }
                for pattern in &layout.remove {
                    validate_regex(&format!("{}.remove", field), pattern)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ProjectConfig::from_toml_str("").unwrap();

        assert_eq!(config.codebook.path, "codebook.md");
        assert_eq!(config.codebook.ignore_code, "-ignorediff");
        assert_eq!(config.codebook.garbage_codes, vec!["cruft"]);
        assert_eq!(config.whowhat.file, "sample-who-what.txt");
        assert_eq!(config.whowhat.pairing, Pairing::WithA);
        assert_eq!(config.compare.max_count_diff, 2);
        assert_eq!(config.extract.pdftotext, "pdftotext");
        assert!(matches!(
            config.extract.required_layouts(Part::Abstract),
            Err(QscriptError::MissingConfigError { .. })
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[codebook]
path = "docs/codebook.md"

[codebook.topics]
design = "architecture"
test = "quality"

[whowhat]
pairing = "neighbors"
subdir_prefix = "abstracts."

[compare]
max_count_diff = 1

[[extract.abstract]]
name = "acmconf"
applies_to = ["FSE", "ICSE-2022", "ICSE-2020"]
start = "(?i)abstract"
end = "(?i)ccs concepts"
remove = ["(?m)^Permission to make.*$"]

[[extract.abstract]]
name = "ieeetrans"
applies_to = ["TSE"]
start = "(?i)abstract\\s*[-—]"

[[extract.conclusion]]
name = "any"
applies_to = ["TSE", "FSE"]
start = "(?i)conclusions?\\n"
end = "(?i)references\\n"
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.codebook.path, "docs/codebook.md");
        assert_eq!(config.codebook.topics.get("test").unwrap(), "quality");
        assert_eq!(config.whowhat.pairing, Pairing::Neighbors);
        assert_eq!(config.whowhat.subdir_prefix.as_deref(), Some("abstracts."));
        assert_eq!(config.compare.max_count_diff, 1);

        let abstracts = config.extract.layouts(Part::Abstract);
        assert_eq!(abstracts.len(), 2);
        assert_eq!(abstracts[0].name, "acmconf");
        assert_eq!(abstracts[1].end, None);
        assert!(abstracts[1].remove.is_empty());
        assert_eq!(config.extract.layouts(Part::Conclusion)[0].name, "any");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("QSCRIPT_TEST_CODEBOOK", "shared/codebook.md");

        let toml_content = r#"
[codebook]
path = "${QSCRIPT_TEST_CODEBOOK}"
ignore_code = "${QSCRIPT_TEST_UNSET_VARIABLE}"
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.codebook.path, "shared/codebook.md");
        assert_eq!(config.codebook.ignore_code, "${QSCRIPT_TEST_UNSET_VARIABLE}");

        std::env::remove_var("QSCRIPT_TEST_CODEBOOK");
    }

    #[test]
    fn test_config_validation_rejects_bad_layout_regex() {
        let toml_content = r#"
[[extract.abstract]]
name = "broken"
applies_to = ["TSE"]
start = "(unclosed"
"#;

        let config = ProjectConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("extract.abstract.broken.start"));
    }

    #[test]
    fn test_unknown_pairing_is_a_parse_error() {
        let result = ProjectConfig::from_toml_str("[whowhat]\npairing = \"all\"\n");
        assert!(matches!(result, Err(QscriptError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[compare]\nmax_count_diff = 5\n")
            .unwrap();

        let config = ProjectConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.compare.max_count_diff, 5);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = ProjectConfig::load(Some(Path::new("/nonexistent/qscript.toml")));
        assert!(matches!(result, Err(QscriptError::FileError { .. })));
    }
}
