use std::path::PathBuf;
use std::str::FromStr;

use message::ChainId;
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use tracing::level_filters::LevelFilter;

/// Comma-separated `name:id` pairs, e.g. `goerli:5,kusama:2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSet(pub Vec<(String, ChainId)>);

impl FromStr for ChainSet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chains = Vec::new();
        for entry in s.split(',').filter(|entry| !entry.trim().is_empty()) {
            let (name, id) = entry
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("chain entry {entry:?} is not name:id"))?;
            chains.push((name.trim().to_owned(), id.trim().parse()?));
        }
        Ok(Self(chains))
    }
}

#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct CliConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_rust_log")]
    pub rust_log: LevelFilter,
    /// Identity the relayer writes checkpoints under.
    pub relayer_operator: String,
    /// Defaults to `.relayer/blockstore` under the home directory.
    #[serde(default)]
    pub relayer_checkpoint_dir: Option<PathBuf>,
    #[serde_as(as = "DisplayFromStr")]
    pub relayer_chains: ChainSet,
    #[serde(default = "default_relayer_block_timeout_secs")]
    pub relayer_block_timeout_secs: u64,
    #[serde(default = "default_relayer_status_bind")]
    pub relayer_status_bind: String,
}

fn default_rust_log() -> LevelFilter {
    LevelFilter::INFO
}

fn default_relayer_block_timeout_secs() -> u64 {
    180
}

fn default_relayer_status_bind() -> String {
    "127.0.0.1:8080".to_owned()
}

pub fn get_cli_config() -> anyhow::Result<CliConfig> {
    Ok(envy::from_env::<CliConfig>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_set_parses_pairs() {
        let chains: ChainSet = "goerli:5, kusama:2".parse().unwrap();
        assert_eq!(
            chains,
            ChainSet(vec![
                ("goerli".to_owned(), ChainId::from(5)),
                ("kusama".to_owned(), ChainId::from(2)),
            ])
        );
    }

    #[test]
    fn test_chain_set_tolerates_trailing_comma() {
        let chains: ChainSet = "goerli:5,".parse().unwrap();
        assert_eq!(chains.0.len(), 1);
    }

    #[test]
    fn test_chain_set_rejects_malformed_entries() {
        assert!("goerli".parse::<ChainSet>().is_err());
        assert!("goerli:nan".parse::<ChainSet>().is_err());
        assert!("goerli:300".parse::<ChainSet>().is_err());
    }
}
