use seikei_core::RulesError;
use seikei_core::prompts::{AnalysisKind, DEFAULT_TEMPERATURE};
use seikei_core::replace::RuleSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_VERSION: u32 = 1;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("home directory not found; set HOME or SEIKEI_HOME")]
    HomeMissing,
    #[error("config io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub reports_dir: PathBuf,
}

impl ConfigPaths {
    /// `$SEIKEI_HOME`, falling back to `~/.seikei`.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Some(base) = std::env::var_os("SEIKEI_HOME").filter(|value| !value.is_empty()) {
            return Ok(Self::from_base(PathBuf::from(base)));
        }
        let home = std::env::var("HOME").map_err(|_| ConfigError::HomeMissing)?;
        Ok(Self::from_base(PathBuf::from(home).join(".seikei")))
    }

    pub fn from_base(base_dir: PathBuf) -> Self {
        let config_path = base_dir.join("config.toml");
        let reports_dir = base_dir.join("reports");
        Self {
            base_dir,
            config_path,
            reports_dir,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
    pub rules: RulesConfig,
    pub reports: ReportsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            llm: LlmConfig::default(),
            analysis: AnalysisConfig::default(),
            rules: RulesConfig::default(),
            reports: ReportsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub kinds: Vec<String>,
    pub temperature: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kinds: vec![AnalysisKind::Summary.as_str().to_string()],
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Replacement rule file; empty means the built-in list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub path: String,
}

/// Saved report directory; empty means `<base>/reports`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub dir: String,
}

impl Config {
    pub fn load_or_create(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        ensure_dirs(paths)?;
        if paths.config_path.exists() {
            return Self::load(paths);
        }

        let config = Self::default();
        Self::write(paths, &config)?;
        Ok(config)
    }

    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        ensure_dirs(paths)?;
        let content = fs::read_to_string(&paths.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
            Self::write(paths, &config)?;
        } else if config.version > CONFIG_VERSION {
            tracing::warn!(
                file_version = config.version,
                supported = CONFIG_VERSION,
                "config version is newer than supported; proceeding"
            );
        }

        warn_if_loose_permissions(&paths.config_path)?;
        Ok(config)
    }

    pub fn write(paths: &ConfigPaths, config: &Config) -> Result<(), ConfigError> {
        ensure_dirs(paths)?;
        let content = toml::to_string_pretty(config)?;
        write_atomic(&paths.config_path, content.as_bytes())?;
        Ok(())
    }

    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        if !redacted.llm.api_key.trim().is_empty() {
            redacted.llm.api_key = "<redacted>".to_string();
        }
        redacted
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.llm.provider.as_str() {
            "openai" | "ollama" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "llm.provider must be openai or ollama (got {other})"
                )));
            }
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Validation(
                "llm.model must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.analysis.temperature) {
            return Err(ConfigError::Validation(
                "analysis.temperature must be between 0 and 2".into(),
            ));
        }
        self.analysis_kinds()?;
        let rules_path = self.rules.path.trim();
        if !rules_path.is_empty() && !Path::new(rules_path).exists() {
            return Err(ConfigError::Validation(format!(
                "rules.path not found: {rules_path}"
            )));
        }
        Ok(())
    }

    pub fn analysis_kinds(&self) -> Result<Vec<AnalysisKind>, ConfigError> {
        parse_kinds(&self.analysis.kinds).map_err(ConfigError::Validation)
    }

    /// Rules from `rules.path`, or the built-in list when unset.
    pub fn rule_set(&self) -> Result<RuleSet, RulesError> {
        let path = self.rules.path.trim();
        if path.is_empty() {
            Ok(RuleSet::builtin())
        } else {
            RuleSet::load(Path::new(path))
        }
    }

    pub fn reports_dir(&self, paths: &ConfigPaths) -> PathBuf {
        let dir = self.reports.dir.trim();
        if dir.is_empty() {
            paths.reports_dir.clone()
        } else {
            PathBuf::from(dir)
        }
    }
}

/// Parse kind names, dropping blanks and duplicates while keeping order.
pub fn parse_kinds<S: AsRef<str>>(values: &[S]) -> Result<Vec<AnalysisKind>, String> {
    let mut kinds = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        let kind: AnalysisKind = value.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

fn ensure_dirs(paths: &ConfigPaths) -> Result<(), ConfigError> {
    fs::create_dir_all(&paths.base_dir)?;
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("config path missing parent directory"))?;
    let tmp_path = parent.join("config.toml.tmp");
    fs::write(&tmp_path, contents)?;
    set_strict_permissions(&tmp_path)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn set_strict_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perm)?;
    }
    Ok(())
}

fn warn_if_loose_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let metadata = fs::metadata(path)?;
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                path = %path.display(),
                mode = %format!("{mode:o}"),
                "config file is group/world readable; set permissions to 0600"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CONFIG_VERSION, Config, ConfigPaths, parse_kinds};
    use seikei_core::prompts::AnalysisKind;
    use std::fs;

    #[test]
    fn load_or_create_writes_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::from_base(temp.path().join("seikei"));
        let config = Config::load_or_create(&paths).unwrap();

        assert!(paths.config_path.exists());
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.analysis.kinds, vec!["summary".to_string()]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&paths.config_path)
                .unwrap()
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn load_fills_missing_sections() {
        let temp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::from_base(temp.path().join("seikei"));
        fs::create_dir_all(&paths.base_dir).unwrap();
        fs::write(
            &paths.config_path,
            "version = 0\n\n[llm]\nprovider = \"ollama\"\nmodel = \"qwen3:8b\"\n",
        )
        .unwrap();

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.llm.provider, "ollama");
        assert!((config.analysis.temperature - 0.3).abs() < f64::EPSILON);

        let updated = fs::read_to_string(&paths.config_path).unwrap();
        assert!(updated.contains("version = 1"));
        assert!(updated.contains("[analysis]"));
    }

    #[cfg(unix)]
    #[test]
    fn loose_permissions_warn_without_failing() {
        use std::os::unix::fs::PermissionsExt;
        let temp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::from_base(temp.path().join("seikei"));
        Config::load_or_create(&paths).unwrap();
        fs::set_permissions(&paths.config_path, fs::Permissions::from_mode(0o644)).unwrap();

        let config = Config::load(&paths).unwrap();
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn redacted_hides_api_key() {
        let mut config = Config::default();
        config.llm.api_key = "sk-secret".to_string();
        assert_eq!(config.redacted().llm.api_key, "<redacted>");
        assert_eq!(Config::default().redacted().llm.api_key, "");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.llm.provider = "bad".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.kinds = vec!["haiku".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rules.path = "/definitely/not/here.toml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_kinds_dedupes_in_order() {
        let kinds = parse_kinds(&["outline", " summary", "", "outline"]).unwrap();
        assert_eq!(kinds, vec![AnalysisKind::Outline, AnalysisKind::Summary]);
    }

    #[test]
    fn rule_set_defaults_to_builtin_and_reads_file() {
        let config = Config::default();
        assert_eq!(config.rule_set().unwrap().len(), 9);

        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("rules.toml");
        fs::write(&path, "[[rules]]\nfind = \"x\"\nreplace = \"y\"\n").unwrap();
        let mut config = Config::default();
        config.rules.path = path.to_string_lossy().to_string();
        assert_eq!(config.rule_set().unwrap().apply("x"), "y");
    }

    #[test]
    fn reports_dir_override() {
        let paths = ConfigPaths::from_base("/tmp/seikei-test".into());
        let mut config = Config::default();
        assert_eq!(config.reports_dir(&paths), paths.reports_dir);
        config.reports.dir = "/srv/reports".to_string();
        assert_eq!(config.reports_dir(&paths), std::path::PathBuf::from("/srv/reports"));
    }
}
