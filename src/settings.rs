use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::grammar::{FieldGrammar, GrammarVariant, SECTION_HEADER};
use crate::sink::db::DEFAULT_TABLE;
use crate::sink::Format;

const CONFIG_BASENAME: &str = "accession";
const ENV_PREFIX: &str = "ACCESSION";

/// Layered settings: defaults, then `accession.toml`, then `ACCESSION_*`
/// environment variables. Command-line flags are applied by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub variant: GrammarVariant,
    pub section_header: String,
    pub trace: bool,
    pub trace_path: PathBuf,
    pub format: Format,
    pub table: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            variant: GrammarVariant::default(),
            section_header: SECTION_HEADER.to_string(),
            trace: true,
            trace_path: PathBuf::from("debug_output.txt"),
            format: Format::default(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_BASENAME).required(false),
        };
        let settings = Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn grammar(&self) -> FieldGrammar {
        FieldGrammar::for_variant(self.variant).with_section_header(self.section_header.clone())
    }

    pub fn validated_grammar(&self) -> Result<FieldGrammar> {
        let grammar = self.grammar();
        grammar.validate()?;
        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::AddressSplit;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.variant, GrammarVariant::Standard);
        assert_eq!(s.format, Format::Csv);
        assert!(s.trace);
        assert_eq!(s.grammar().section_header(), "Accession Records");
    }

    #[test]
    fn presets_validate() {
        for variant in [GrammarVariant::Legacy, GrammarVariant::CommaSplit, GrammarVariant::Standard] {
            let s = Settings {
                variant,
                ..Settings::default()
            };
            assert!(s.validated_grammar().is_ok(), "{:?}", variant);
        }
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accession.toml");
        std::fs::write(
            &path,
            "variant = \"comma-split\"\nformat = \"json\"\nsection_header = \"Loan Records\"\ntrace = false\n",
        )
        .unwrap();
        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.variant, GrammarVariant::CommaSplit);
        assert_eq!(s.format, Format::Json);
        assert!(!s.trace);
        assert_eq!(s.table, "accessions");
        let g = s.grammar();
        assert_eq!(g.section_header(), "Loan Records");
        assert_eq!(g.address_split(), AddressSplit::CommaSplit);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
