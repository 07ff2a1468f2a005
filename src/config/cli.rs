use super::toml_config::{SinkKind, SyncConfig};
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "gold-sync")]
#[command(about = "Scrape gold prices and sync them into a spreadsheet or a text file")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, value_enum, help = "Override the output sink")]
    pub sink: Option<SinkKind>,

    #[arg(long, help = "Output file for the file sink")]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入 TOML 配置（若有），再套用命令列覆寫
    pub fn load(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::from_file(path)?,
            None => SyncConfig::default(),
        };

        if let Some(output) = &self.output {
            config.file.path = output.clone();
            if self.sink.is_none() {
                config.sink.kind = SinkKind::File;
            }
        }
        if let Some(sink) = self.sink {
            config.sink.kind = sink;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_uses_defaults() {
        let cli = CliConfig::parse_from(["gold-sync"]);
        let config = cli.load().unwrap();
        assert_eq!(config.sink.kind, SinkKind::Sheet);
    }

    #[test]
    fn test_output_implies_file_sink() {
        let cli = CliConfig::parse_from(["gold-sync", "--output", "prices.txt"]);
        let config = cli.load().unwrap();
        assert_eq!(config.sink.kind, SinkKind::File);
        assert_eq!(config.file.path, "prices.txt");
    }

    #[test]
    fn test_explicit_sink_wins() {
        let cli = CliConfig::parse_from(["gold-sync", "--sink", "sheet", "--output", "x.txt"]);
        assert_eq!(cli.load().unwrap().sink.kind, SinkKind::Sheet);
    }
}
