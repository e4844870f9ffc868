//! The codebook: which codes exist and which suffixes each code allows.
//!
//! Codes are defined anywhere in `codebook.md` by text of the form
//! ``code `name:suffix1:suffix2` ``. Each suffix definition is a regular
//! expression that must match one whole suffix of a coding, e.g.
//! ``code `gap:i\d:u\d` `` allows `gap`, `gap:i1` and `gap:i2:u1`.

use crate::config::toml_config::CodebookConfig;
use crate::domain::ports::Storage;
use crate::utils::error::{QscriptError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

pub const SUFFIX_SEPARATOR: char = ':';

static CODEDEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)code `([\w-]+)((?::[^:`]+)+)?`").expect("valid regex")
});

#[derive(Debug, Clone)]
pub struct CodeDef {
    pub code: String,
    /// The colon-separated suffix definitions, without the leading colon
    pub suffixdef: String,
    suffix_regexp: Regex,
}

impl CodeDef {
    pub fn new(code: &str, suffixdef: &str) -> Result<Self> {
        let alternatives = suffixdef.replace(SUFFIX_SEPARATOR, "|");
        let anchored = format!("^(?:{})$", alternatives);
        let suffix_regexp =
            Regex::new(&anchored).map_err(|e| QscriptError::pattern(&alternatives, e))?;
        Ok(Self {
            code: code.to_string(),
            suffixdef: suffixdef.to_string(),
            suffix_regexp,
        })
    }

    pub fn allows(&self, suffix: &str) -> bool {
        self.suffix_regexp.is_match(suffix)
    }
}

#[derive(Debug, Clone)]
pub struct Codebook {
    codedefs: HashMap<String, CodeDef>,
    /// Codes in order of definition
    order: Vec<String>,
    config: CodebookConfig,
}

impl Codebook {
    pub fn load<S: Storage>(storage: &S, config: &CodebookConfig) -> Result<Self> {
        let path = Path::new(&config.path);
        let content = storage.read_to_string(path)?;
        let codebook = Self::parse(&content, config)?;
        tracing::debug!("{}: {} codes", path.display(), codebook.order.len());
        Ok(codebook)
    }

    pub fn parse(content: &str, config: &CodebookConfig) -> Result<Self> {
        let mut codedefs = HashMap::new();
        let mut order = Vec::new();
        for caps in CODEDEF.captures_iter(content) {
            let code = &caps[1];
            let suffixdef = caps
                .get(2)
                .map(|m| m.as_str().trim_start_matches(SUFFIX_SEPARATOR))
                .unwrap_or("");
            let codedef = CodeDef::new(code, suffixdef)?;
            if codedefs.insert(code.to_string(), codedef).is_none() {
                order.push(code.to_string());
            }
        }
        Ok(Self {
            codedefs,
            order,
            config: config.clone(),
        })
    }

    pub fn exists(&self, code: &str) -> bool {
        self.codedefs.contains_key(code)
    }

    pub fn get(&self, code: &str) -> Option<&CodeDef> {
        self.codedefs.get(code)
    }

    /// All code definitions in the order they appear in the codebook.
    pub fn codedefs(&self) -> impl Iterator<Item = &CodeDef> {
        self.order.iter().filter_map(|code| self.codedefs.get(code))
    }

    pub fn ignore_code(&self) -> &str {
        &self.config.ignore_code
    }

    /// Check every suffix of a coding such as `:i1:u2`. Empty suffixes are always fine.
    pub fn check_suffix(&self, code: &str, fullsuffix: &str) -> Result<()> {
        if fullsuffix.is_empty() {
            return Ok(());
        }
        let codedef = self
            .codedefs
            .get(code)
            .ok_or_else(|| QscriptError::coding(format!("unknown code: '{}'", code)))?;
        let fullsuffix = fullsuffix
            .strip_prefix(SUFFIX_SEPARATOR)
            .unwrap_or(fullsuffix);
        for suffix in fullsuffix.split(SUFFIX_SEPARATOR) {
            if !codedef.allows(suffix) {
                return Err(QscriptError::coding(format!(
                    "suffix '{}' not allowed for code '{}': {}{}{}",
                    suffix, code, code, SUFFIX_SEPARATOR, codedef.suffixdef
                )));
            }
        }
        Ok(())
    }

    pub fn is_extra_code(code: &str) -> bool {
        code.starts_with('-')
    }

    /// Extra codes express a coder's opinion, except the one that silences differences.
    pub fn is_subjective_code(&self, code: &str) -> bool {
        Self::is_extra_code(code) && code != self.config.ignore_code
    }

    pub fn is_heading_code(code: &str) -> bool {
        code.starts_with("h-")
    }

    pub fn is_garbage_code(&self, code: &str) -> bool {
        self.config.garbage_codes.iter().any(|g| g == code)
    }

    /// Code group, for a coarser analysis. `a-` and `h-` variants share the topic of their base code.
    pub fn topic<'a>(&'a self, code: &str) -> Result<&'a str> {
        if Self::is_extra_code(code) {
            return Ok(&self.config.none_topic);
        }
        if let Some(base) = code.strip_prefix("a-").or_else(|| code.strip_prefix("h-")) {
            return self.topic(base);
        }
        self.config
            .topics
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| QscriptError::coding(format!("no topic known for code '{}'", code)))
    }
}
