// Language table for the remote execution service
use anyhow::{bail, Context, Result};
use grader_common::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/languages.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Judge0 `language_id`
    pub language_id: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageEntry>,
}

/// Immutable mapping from language tags to remote-service identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    entries: HashMap<Language, LanguageEntry>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LanguageTable {
    /// Node.js, Python 3 and Java identifiers of the public Judge0 CE instance
    pub fn builtin() -> Self {
        Self::from_entries([
            (Language::JavaScript, "Node.js", 63),
            (Language::Python, "Python 3", 71),
            (Language::Java, "Java", 62),
        ])
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Language, &'static str, u32)>,
    {
        let entries = entries
            .into_iter()
            .map(|(language, version, language_id)| {
                (
                    language,
                    LanguageEntry {
                        name: language.to_string(),
                        version: Some(version.to_string()),
                        language_id,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Load the table from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path).context("Failed to read languages.json")?;
        let languages_json: LanguagesJson =
            serde_json::from_str(&content).context("Failed to parse languages.json")?;

        let mut entries = HashMap::new();
        for entry in languages_json.languages {
            let language: Language = entry
                .name
                .parse()
                .with_context(|| format!("Unknown language '{}' in languages.json", entry.name))?;
            entries.insert(language, entry);
        }

        if entries.is_empty() {
            bail!("No languages configured in languages.json");
        }

        Ok(Self { entries })
    }

    /// LANGUAGES_CONFIG or config/languages.json, built-in table when neither exists
    pub fn load_default() -> Result<Self> {
        match std::env::var("LANGUAGES_CONFIG") {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::builtin())
                }
            }
        }
    }

    pub fn get(&self, language: Language) -> Option<&LanguageEntry> {
        self.entries.get(&language)
    }

    pub fn language_id(&self, language: Language) -> Option<u32> {
        self.get(language).map(|entry| entry.language_id)
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        self.entries.contains_key(&language)
    }

    pub fn list_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.entries.keys().copied().collect();
        languages.sort_by_key(|l| l.as_str());
        languages
    }
}
