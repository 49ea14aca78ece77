use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "graphdiag.yaml";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat { Text, Json }

/// Per-subcommand settings. Flags given on the command line win.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub timeout_ms: Option<u64>,
    pub attempt_timeout_ms: Option<u64>,
    pub pacing_ms: Option<u64>,
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub extra_passwords: Vec<String>,
    pub wordlist: Option<PathBuf>,
    pub smoke_label: Option<String>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub diagnose: Option<SectionConfig>,
    pub discover: Option<SectionConfig>,
    pub check: Option<SectionConfig>,
    pub setup: Option<SectionConfig>,
}

/// Load `path`, or `./graphdiag.yaml` when present. A missing default file is not an error;
/// an explicit path that cannot be read or parsed is.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg = serde_yaml::from_str(&s).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("g.yaml");
        fs::write(
            &p,
            "discover:\n  pacing_ms: 250\n  extra_passwords: [letmein, changeme]\n  format: json\ncheck:\n  smoke_label: DSAssist\n",
        )
        .unwrap();
        let cfg = load_config(Some(&p)).unwrap().unwrap();
        let d = cfg.discover.unwrap();
        assert_eq!(d.pacing_ms, Some(250));
        assert_eq!(d.extra_passwords, vec!["letmein", "changeme"]);
        assert_eq!(d.format, Some(OutputFormat::Json));
        assert_eq!(cfg.check.unwrap().smoke_label.as_deref(), Some("DSAssist"));
        assert!(cfg.diagnose.is_none());
    }

    #[test]
    fn explicit_missing_file_is_error() {
        assert!(load_config(Some(Path::new("/nonexistent/graphdiag.yaml"))).is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("g.yaml");
        fs::write(&p, "diagnose:\n  timeout: 5\n").unwrap();
        assert!(load_config(Some(&p)).is_err());
    }

    #[test]
    fn unknown_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("g.yaml");
        fs::write(&p, "check:\n  format: jsonl\n").unwrap();
        assert!(load_config(Some(&p)).is_err());
    }
}
