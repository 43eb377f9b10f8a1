use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_file: PathBuf,
    pub log_level: String,
}

#[derive(Parser, Debug)]
#[command(name = "mini-lsp")]
#[command(about = "Minimal language server speaking LSP over stdio", long_about = None)]
pub struct Cli {
    /// File receiving diagnostic output; truncated on startup
    #[arg(long, default_value = "mini-lsp.log")]
    log_file: PathBuf,
    /// Default tracing filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    pub fn from_args() -> Self {
        Self::parse()
    }

    pub fn into_config(self) -> Config {
        Config {
            log_file: self.log_file,
            log_level: self.log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Cli::try_parse_from(["mini-lsp"]).unwrap().into_config();
        assert_eq!(config.log_file, PathBuf::from("mini-lsp.log"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Cli::try_parse_from([
            "mini-lsp",
            "--log-file",
            "/tmp/lsp.log",
            "--log-level",
            "mini_lsp=trace",
        ])
        .unwrap()
        .into_config();
        assert_eq!(config.log_file, PathBuf::from("/tmp/lsp.log"));
        assert_eq!(config.log_level, "mini_lsp=trace");
    }

    #[test]
    fn test_rejects_positional_arguments() {
        assert!(Cli::try_parse_from(["mini-lsp", "extra"]).is_err());
    }
}
