use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;

use crate::{context::Options, error::Error, output::Outputs};

/// Settings file, e.g.
///
/// ```yaml
/// origin: 100
/// list: true
/// binary: false
/// max_line_len: 80
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub origin: Option<u16>,
    pub max_line_len: Option<usize>,
    pub list: bool,
    pub binary: bool,
    pub map: bool,
    pub no_output: bool,
}

/// Everything a run needs once the file and the command line are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub options: Options,
    pub outputs: Outputs,
    pub list: bool,
    pub no_output: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Config, Error> {
        let file = File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|e| Error::Config(path.to_string(), e))
    }

    pub fn parse(text: &str) -> Result<Config, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Command-line values win; flags only switch things on.
    pub fn merge(self, cli: Config) -> Settings {
        let defaults = Options::default();
        Settings {
            options: Options {
                origin: cli.origin.or(self.origin).unwrap_or(defaults.origin),
                max_line_len: cli
                    .max_line_len
                    .or(self.max_line_len)
                    .unwrap_or(defaults.max_line_len),
            },
            outputs: Outputs {
                binary: cli.binary || self.binary,
                map: cli.map || self.map,
            },
            list: cli.list || self.list,
            no_output: cli.no_output || self.no_output,
        }
    }
}
