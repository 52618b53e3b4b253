// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Layered configuration of the application.
//!
//! Every setting is optional in each source so that a source only overrides
//! the settings it actually provides.

use std::fmt;
use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use minsim_network::routing::PriorityPolicy;
use minsim_network::sim_error;
use minsim_network::topology::Topology;
use minsim_network::types::SimError;
use serde::{Deserialize, Serialize};

use crate::traffic::TrafficPattern;

/// Prefix of the environment variables read by the application.
pub const ENV_PREFIX: &str = "MINSIM_";

const DEFAULT_NUM_WIRES: usize = 256;
const DEFAULT_MESSAGES_PER_WIRE: usize = 512;
const DEFAULT_SEED: u64 = 1;

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyChoice {
    Baseline,
    Butterfly,

    /// Run each topology in turn
    #[default]
    All,
}

impl TopologyChoice {
    #[must_use]
    pub fn topologies(&self) -> Vec<Topology> {
        match self {
            TopologyChoice::Baseline => vec![Topology::Baseline],
            TopologyChoice::Butterfly => vec![Topology::Butterfly],
            TopologyChoice::All => Topology::ALL.to_vec(),
        }
    }
}

impl fmt::Display for TopologyChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyChoice {
    Static,
    RoundRobin,

    /// Run each priority policy in turn
    #[default]
    All,
}

impl PolicyChoice {
    #[must_use]
    pub fn policies(&self) -> Vec<PriorityPolicy> {
        match self {
            PolicyChoice::Static => vec![PriorityPolicy::Static],
            PolicyChoice::RoundRobin => vec![PriorityPolicy::RoundRobin],
            PolicyChoice::All => PriorityPolicy::ALL.to_vec(),
        }
    }
}

impl fmt::Display for PolicyChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Settings of a simulation run.
#[derive(clap::Args, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of input (and output) wires, a power of two
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_wires: Option<usize>,

    /// Number of messages waiting on each input wire at the start
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_per_wire: Option<usize>,

    /// Network topology to simulate
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologyChoice>,

    /// Priority policy used to resolve conflicts
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<PolicyChoice>,

    /// How the destinations of messages are chosen
    #[arg(long, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_pattern: Option<TrafficPattern>,

    /// Seed for random number generator
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_wires: Some(DEFAULT_NUM_WIRES),
            messages_per_wire: Some(DEFAULT_MESSAGES_PER_WIRE),
            topology: Some(TopologyChoice::default()),
            policy: Some(PolicyChoice::default()),
            traffic_pattern: Some(TrafficPattern::default()),
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl SimConfig {
    /// A configuration that sets nothing.
    #[must_use]
    pub fn unset() -> Self {
        Self {
            num_wires: None,
            messages_per_wire: None,
            topology: None,
            policy: None,
            traffic_pattern: None,
            seed: None,
        }
    }

    /// Combine all configuration sources. `cli` holds the values given on
    /// the command line and takes precedence over everything else.
    pub fn load(conf_file: Option<&Path>, cli: &SimConfig) -> Result<Self, SimError> {
        let mut figment = Self::figment_with_defaults();
        if let Some(conf_file) = conf_file {
            if !conf_file.is_file() {
                return sim_error!(format!(
                    "Configuration file '{}' not found",
                    conf_file.display()
                ));
            }
            figment = Self::figment_conf_file_merge(figment, conf_file);
        }
        figment = Self::figment_env_var_merge(figment);
        let config = Self::figment_extract(&figment)?;
        Ok(config.clap_merge(cli))
    }

    fn figment_with_defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(SimConfig::default()))
    }

    fn figment_conf_file_merge(config: Figment, conf_file: &Path) -> Figment {
        config.merge(Toml::file(conf_file))
    }

    fn figment_env_var_merge(config: Figment) -> Figment {
        config.merge(Env::prefixed(ENV_PREFIX))
    }

    fn figment_extract(config: &Figment) -> Result<Self, SimError> {
        config
            .extract()
            .map_err(|e| SimError::InvalidConfig(format!("Bad configuration: {e}")))
    }

    /// Override any values that are set in `cli`.
    #[must_use]
    pub fn clap_merge(self, cli: &SimConfig) -> Self {
        Self {
            num_wires: cli.num_wires.or(self.num_wires),
            messages_per_wire: cli.messages_per_wire.or(self.messages_per_wire),
            topology: cli.topology.or(self.topology),
            policy: cli.policy.or(self.policy),
            traffic_pattern: cli.traffic_pattern.or(self.traffic_pattern),
            seed: cli.seed.or(self.seed),
        }
    }

    #[must_use]
    pub fn num_wires(&self) -> usize {
        self.num_wires.unwrap_or(DEFAULT_NUM_WIRES)
    }

    #[must_use]
    pub fn messages_per_wire(&self) -> usize {
        self.messages_per_wire.unwrap_or(DEFAULT_MESSAGES_PER_WIRE)
    }

    #[must_use]
    pub fn topology(&self) -> TopologyChoice {
        self.topology.unwrap_or_default()
    }

    #[must_use]
    pub fn policy(&self) -> PolicyChoice {
        self.policy.unwrap_or_default()
    }

    #[must_use]
    pub fn traffic_pattern(&self) -> TrafficPattern {
        self.traffic_pattern.unwrap_or_default()
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Capacity of each output wire, large enough for every message to be
    /// delivered to the same wire.
    #[must_use]
    pub fn output_capacity(&self) -> usize {
        self.num_wires() * self.messages_per_wire()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        sim: SimConfig,
    }

    fn conf_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = SimConfig::default();
        assert_eq!(config.num_wires(), 256);
        assert_eq!(config.messages_per_wire(), 512);
        assert_eq!(config.topology(), TopologyChoice::All);
        assert_eq!(config.policy(), PolicyChoice::All);
        assert_eq!(config.traffic_pattern(), TrafficPattern::Random);
        assert_eq!(config.output_capacity(), 256 * 512);
    }

    #[test]
    fn cli_overrides_only_what_is_given() {
        let cli = TestCli::parse_from(["test", "--num-wires", "16", "--policy", "round-robin"]);
        let config = SimConfig::default().clap_merge(&cli.sim);
        assert_eq!(config.num_wires(), 16);
        assert_eq!(config.policy(), PolicyChoice::RoundRobin);
        assert_eq!(config.messages_per_wire(), 512);
        assert_eq!(config.topology(), TopologyChoice::All);
    }

    #[test]
    fn file_then_cli() {
        let file = conf_file(
            "num_wires = 32\nmessages_per_wire = 4\ntopology = \"butterfly\"\ntraffic_pattern = \"bit-reversal\"\n",
        );
        let cli = TestCli::parse_from(["test", "--messages-per-wire", "9"]);
        let config = SimConfig::load(Some(file.path()), &cli.sim).unwrap();
        assert_eq!(config.num_wires(), 32);
        assert_eq!(config.messages_per_wire(), 9);
        assert_eq!(config.topology(), TopologyChoice::Butterfly);
        assert_eq!(config.traffic_pattern(), TrafficPattern::BitReversal);
        assert_eq!(config.seed(), 1);
    }

    #[test]
    fn bad_file_value() {
        let file = conf_file("topology = \"ring\"\n");
        let result = SimConfig::load(Some(file.path()), &SimConfig::unset());
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn missing_file() {
        let result = SimConfig::load(
            Some(Path::new("/does/not/exist/minsim.toml")),
            &SimConfig::unset(),
        );
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn choices_expand() {
        assert_eq!(TopologyChoice::All.topologies(), Topology::ALL.to_vec());
        assert_eq!(
            PolicyChoice::RoundRobin.policies(),
            vec![PriorityPolicy::RoundRobin]
        );
    }
}
