use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::app::{MergeInputs, MergeOptions};
use crate::domain::Cardinality;
use crate::error::MergeError;
use crate::tsv::ReadOptions;

pub const DEFAULT_CONFIG_FILE: &str = "kira-am.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub anno_uniprot_besthit: Option<Utf8PathBuf>,
    #[serde(default)]
    pub trans_uniprot: Option<Utf8PathBuf>,
    #[serde(default)]
    pub trans_go: Option<Utf8PathBuf>,
    #[serde(default)]
    pub trans_kegg: Option<Utf8PathBuf>,
    #[serde(default)]
    pub trans_kog: Option<Utf8PathBuf>,
    #[serde(default)]
    pub trans_pfam: Option<Utf8PathBuf>,
    #[serde(default)]
    pub output: Option<Utf8PathBuf>,
    #[serde(default)]
    pub one_row_per_qseqid: bool,
    #[serde(default)]
    pub keep_na_strings: bool,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub inputs: MergeInputs,
    pub output: Utf8PathBuf,
    pub options: MergeOptions,
    pub read: ReadOptions,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: Option<&str>) -> Result<Option<Config>, MergeError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| MergeError::ConfigRead(config_path.clone()))?;
        Self::parse(&content).map(Some)
    }

    pub fn parse(content: &str) -> Result<Config, MergeError> {
        serde_json::from_str(content).map_err(|err| MergeError::ConfigParse(err.to_string()))
    }

    pub fn resolve(file: Option<Config>, overrides: Config) -> Result<ResolvedConfig, MergeError> {
        let file = file.unwrap_or_default();
        let pick = |cli: Option<Utf8PathBuf>, from_file: Option<Utf8PathBuf>, flag: &str| {
            cli.or(from_file)
                .ok_or_else(|| MergeError::MissingArgument(flag.to_string()))
        };

        let inputs = MergeInputs {
            best_hits: pick(
                overrides.anno_uniprot_besthit,
                file.anno_uniprot_besthit,
                "--anno_uniprot_besthit",
            )?,
            trans_uniprot: pick(overrides.trans_uniprot, file.trans_uniprot, "--trans_uniprot")?,
            go: pick(overrides.trans_go, file.trans_go, "--trans_go")?,
            kegg: pick(overrides.trans_kegg, file.trans_kegg, "--trans_kegg")?,
            kog: pick(overrides.trans_kog, file.trans_kog, "--trans_kog")?,
            pfam: pick(overrides.trans_pfam, file.trans_pfam, "--trans_pfam")?,
        };
        let output = pick(overrides.output, file.output, "--output")?;

        Ok(ResolvedConfig {
            inputs,
            output,
            options: MergeOptions {
                cardinality: Cardinality::from_one_row_per_query(
                    overrides.one_row_per_qseqid || file.one_row_per_qseqid,
                ),
            },
            read: ReadOptions {
                keep_na_strings: overrides.keep_na_strings || file.keep_na_strings,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn full() -> Config {
        Config {
            anno_uniprot_besthit: Some("hits.tsv".into()),
            trans_uniprot: Some("uniprot.xls".into()),
            trans_go: Some("go.xls".into()),
            trans_kegg: Some("kegg.xls".into()),
            trans_kog: Some("kog.xls".into()),
            trans_pfam: Some("pfam.xls".into()),
            output: Some("out/merged.tsv".into()),
            one_row_per_qseqid: false,
            keep_na_strings: false,
        }
    }

    #[test]
    fn command_line_overrides_file() {
        let overrides = Config {
            output: Some("cli.tsv".into()),
            one_row_per_qseqid: true,
            ..Config::default()
        };
        let resolved = ConfigLoader::resolve(Some(full()), overrides).unwrap();
        assert_eq!(resolved.output.as_str(), "cli.tsv");
        assert_eq!(resolved.inputs.go.as_str(), "go.xls");
        assert_eq!(resolved.options.cardinality, Cardinality::Collapse);
        assert!(!resolved.read.keep_na_strings);
    }

    #[test]
    fn missing_path_is_reported_by_flag() {
        let mut file = full();
        file.trans_kog = None;
        let err = ConfigLoader::resolve(Some(file), Config::default()).unwrap_err();
        assert_matches!(err, MergeError::MissingArgument(ref flag) if flag == "--trans_kog");
    }

    #[test]
    fn parses_partial_json() {
        let config = ConfigLoader::parse(r#"{"trans_go": "go.xls", "one_row_per_qseqid": true}"#)
            .unwrap();
        assert_eq!(config.trans_go.as_deref().map(|p| p.as_str()), Some("go.xls"));
        assert!(config.one_row_per_qseqid);
        assert!(config.output.is_none());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ConfigLoader::parse(r#"{"trans_go": "go.xls", "typo": 1}"#).unwrap_err();
        assert_matches!(err, MergeError::ConfigParse(_));
    }
}
