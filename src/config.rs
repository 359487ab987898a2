use crate::constants::PORTAL_URL;
use crate::errors::{AppError, AppResult};
use crate::models::SyncMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_REGIONS: &[&str] = &["SP", "MG", "RJ", "ES", "PR", "SC", "RS", "DF"];

const DEFAULT_KEYWORDS: &[&str] = &[
    "vigilancia",
    "seguranca",
    "videomonitoramento",
    "cftv",
    "monitoramento",
];

const DEFAULT_EXCLUSIONS: &[&str] = &[
    "sanitaria",
    "sanitario",
    "saude",
    "epidemiologica",
    "glicemia",
    "hospitalar",
    "ambulatorial",
    "uniformes",
    "mochilas",
    "crachas",
    "coletes",
    "veiculos",
    "viatura",
    "tablets",
    "informatica",
    "software",
    "sistema",
    "obras",
    "engenharia",
    "passeios",
    "construcao",
    "guarita",
    "alimentacao",
    "cartao",
    "beneficio",
    "material didatico",
    "mesa",
    "pia",
    "inox",
    "leitor de codigo",
    "impressora",
    "transporte",
    "cartão",
    "alimentação",
    "condicionado",
];

// Priority order: the first phrase found in the object text wins.
const DEFAULT_OBJECT_PHRASES: &[&str] = &[
    "vigilancia armada",
    "vigilancia desarmada",
    "seguranca armada",
    "seguranca desarmada",
    "seguranca eletronica",
    "servicos de vigilancia",
    "vigilancia patrimonial",
    "videomonitoramento",
    "cftv",
    "monitoramento",
    "vigilancia",
    "seguranca",
];

const DEFAULT_ORG_PREFIXES: &[&str] = &[
    "prefeitura municipal de",
    "municipio de",
    "câmara municipal de",
    "fundo municipal de",
    "secretaria municipal de",
];

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Resolved configuration with all values filled in (no Options).
///
/// Defaults reproduce the portal search the tool was built for. Every field can be
/// overridden from a TOML file or, for the most common ones, from CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    // Search plan
    /// Region codes (UF) searched for every keyword, in order
    pub regions: Vec<String>,
    /// Search keywords sent to the portal, in order
    pub keywords: Vec<String>,
    /// Substrings that reject a listing when found in its object text
    pub exclusions: Vec<String>,
    /// Canonical object phrases, highest priority first
    pub object_phrases: Vec<String>,
    /// Boilerplate prefixes removed from organization names
    pub org_prefixes: Vec<String>,
    /// Portal base URL
    pub portal_url: String,

    // Ledger
    /// Spreadsheet name
    pub spreadsheet: String,
    /// Worksheet (tab) name
    pub sheet: String,
    /// Service account JSON key
    pub credentials: PathBuf,
    /// 1-based row holding the column headers
    pub header_row: u32,
    /// Whether the ledger is cleared before crawling
    pub sync_mode: SyncMode,
    /// Whether rows carry the trailing estimated value column
    pub include_estimated_value: bool,

    // Browser session
    /// Run the browser without a window
    pub headless: bool,
    pub results_timeout_secs: u64,
    pub detail_timeout_secs: u64,
    pub cookie_timeout_secs: u64,
    /// Interval between checks while waiting for page conditions
    pub poll_interval_ms: u64,
    /// Pause after the results signal before reading the page
    pub results_settle_ms: u64,
    /// Pause after moving to the next item page
    pub page_settle_ms: u64,
    /// Pause before each detail page visit
    pub detail_delay_ms: u64,
    /// Pause after each ledger append
    pub persist_delay_ms: u64,
    /// Upper bound on item pages aggregated per listing
    pub max_item_pages: u32,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            regions: to_strings(DEFAULT_REGIONS),
            keywords: to_strings(DEFAULT_KEYWORDS),
            exclusions: to_strings(DEFAULT_EXCLUSIONS),
            object_phrases: to_strings(DEFAULT_OBJECT_PHRASES),
            org_prefixes: to_strings(DEFAULT_ORG_PREFIXES),
            portal_url: PORTAL_URL.to_string(),
            spreadsheet: "tabelapy".to_string(),
            sheet: "Página1".to_string(),
            credentials: PathBuf::from("credentials.json"),
            header_row: 1,
            sync_mode: SyncMode::Rebuild,
            include_estimated_value: true,
            headless: true,
            results_timeout_secs: 45,
            detail_timeout_secs: 20,
            cookie_timeout_secs: 20,
            poll_interval_ms: 250,
            results_settle_ms: 2000,
            page_settle_ms: 1500,
            detail_delay_ms: 1000,
            persist_delay_ms: 1500,
            max_item_pages: 50,
        }
    }
}

/// Filtering inputs for the classifier.
#[derive(Debug, Clone)]
pub struct FilterConfig<'a> {
    /// Informational: inclusion is enforced by the portal search keyword.
    pub inclusion_phrases: &'a [String],
    pub exclusions: &'a [String],
}

/// Inputs for the object and organization normalizers.
#[derive(Debug, Clone)]
pub struct NormalizeConfig<'a> {
    pub object_phrases: &'a [String],
    pub org_prefixes: &'a [String],
}

/// Bounded waits and politeness delays for the browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub results: Duration,
    pub detail: Duration,
    pub cookie: Duration,
    pub results_settle: Duration,
    pub page_settle: Duration,
    pub detail_delay: Duration,
    pub persist_delay: Duration,
}

impl ResolvedConfig {
    pub fn filter(&self) -> FilterConfig<'_> {
        FilterConfig {
            inclusion_phrases: &self.keywords,
            exclusions: &self.exclusions,
        }
    }

    pub fn normalize(&self) -> NormalizeConfig<'_> {
        NormalizeConfig {
            object_phrases: &self.object_phrases,
            org_prefixes: &self.org_prefixes,
        }
    }

    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            results: Duration::from_secs(self.results_timeout_secs),
            detail: Duration::from_secs(self.detail_timeout_secs),
            cookie: Duration::from_secs(self.cookie_timeout_secs),
            results_settle: Duration::from_millis(self.results_settle_ms),
            page_settle: Duration::from_millis(self.page_settle_ms),
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            persist_delay: Duration::from_millis(self.persist_delay_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Checks the invariants the crawl relies on.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when there is nothing to search for, the header row is
    /// zero, or a bound that must be positive is zero.
    pub fn validate(&self) -> AppResult<()> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "At least one keyword is required".into(),
            ));
        }
        if self.regions.iter().all(|r| r.trim().is_empty()) {
            return Err(AppError::InvalidInput(
                "At least one region is required".into(),
            ));
        }
        if self.header_row == 0 {
            return Err(AppError::InvalidInput(
                "Header row is 1-based and must be greater than 0".into(),
            ));
        }
        if self.max_item_pages == 0 {
            return Err(AppError::InvalidInput(
                "Max item pages must be greater than 0".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(AppError::InvalidInput(
                "Poll interval must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration that can be loaded from a TOML file.
///
/// Every key is optional; missing keys take the defaults of [`ResolvedConfig`].
/// The parser rejects unknown keys to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedConfigFile {
    /// Log records instead of writing them to the spreadsheet (defaults to `false`)
    #[serde(default)]
    pub dry_run: bool,
    /// Flattened resolved configuration
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
}

impl ResolvedConfigFile {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `InvalidInput` if the TOML is
    /// malformed, unknown keys are present, or [`ResolvedConfig::validate`] fails.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfigFile = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        config.resolved.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_values() {
        let config = ResolvedConfig::default();
        assert_eq!(config.regions.len(), 8);
        assert_eq!(config.regions[0], "SP");
        assert_eq!(config.keywords[0], "vigilancia");
        assert_eq!(config.object_phrases[0], "vigilancia armada");
        assert_eq!(config.object_phrases.last().unwrap(), "seguranca");
        assert_eq!(config.header_row, 1);
        assert_eq!(config.sync_mode, SyncMode::Rebuild);
        assert!(config.headless);
        assert_eq!(config.max_item_pages, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn timeouts_are_derived_from_seconds_and_millis() {
        let config = ResolvedConfig::default();
        let timeouts = config.timeouts();
        assert_eq!(timeouts.results, Duration::from_secs(45));
        assert_eq!(timeouts.detail, Duration::from_secs(20));
        assert_eq!(timeouts.persist_delay, Duration::from_millis(1500));
    }

    #[test]
    fn minimal_toml_is_parsed_and_defaults_apply() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            regions = ["SP", "RJ"]
            keywords = ["cftv"]
            sync_mode = "incremental"
            "#,
        )
        .unwrap();

        let config = ResolvedConfigFile::from_toml_file(tmp.path()).unwrap();
        assert!(!config.dry_run);
        assert_eq!(config.resolved.regions, vec!["SP", "RJ"]);
        assert_eq!(config.resolved.keywords, vec!["cftv"]);
        assert_eq!(config.resolved.sync_mode, SyncMode::Incremental);
        assert_eq!(config.resolved.spreadsheet, "tabelapy");
        assert_eq!(config.resolved.max_item_pages, 50);
    }

    #[test]
    fn empty_keywords_are_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "keywords = []").unwrap();

        assert!(ResolvedConfigFile::from_toml_file(tmp.path()).is_err());
    }

    #[test]
    fn zero_page_ceiling_is_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "max_item_pages = 0").unwrap();

        assert!(ResolvedConfigFile::from_toml_file(tmp.path()).is_err());
    }

    #[test]
    fn unknown_key_errors() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
            regions = ["SP"]
            extra_flag = true
            "#,
        )
        .unwrap();

        assert!(ResolvedConfigFile::from_toml_file(tmp.path()).is_err());
    }
}
