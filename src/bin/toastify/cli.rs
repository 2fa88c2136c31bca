use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use humantime::parse_duration;
use toastify::types::ThemeMode;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ThemeArg {
    Auto,
    Light,
    Dark,
}

impl ThemeArg {
    pub const fn mode(self) -> Option<ThemeMode> {
        match self {
            Self::Auto => None,
            Self::Light => Some(ThemeMode::Light),
            Self::Dark => Some(ThemeMode::Dark),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays a queue of toast notifications", long_about = None)]
pub struct Cli {
    /// Chemin du fichier de configuration TOML.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Palette des toasts ("auto" suit le thème du système).
    #[arg(long, value_enum)]
    pub theme: Option<ThemeArg>,

    /// Largeur simulée de la fenêtre, en pixels.
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub viewport: Option<u32>,

    /// Délai avant le premier toast (ex. "1s").
    #[arg(long, value_parser = parse_duration)]
    pub start_after: Option<Duration>,

    /// Intervalle entre deux toasts (ex. "2s").
    #[arg(long, value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Délai de disparition ; "0s" garde le dernier toast affiché.
    #[arg(long, value_parser = parse_duration)]
    pub fade_out: Option<Duration>,

    /// Valide la configuration et affiche la file sans la jouer.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Utilise un layer JSON pour les logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Filtre de logs explicite (ex. "toastify=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, ThemeArg};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn parses_overrides() {
        let cli = match Cli::try_parse_from([
            "toastify",
            "--theme",
            "dark",
            "--viewport",
            "400",
            "--fade-out",
            "0s",
        ]) {
            Ok(cli) => cli,
            Err(err) => panic!("arguments should parse: {err}"),
        };
        assert_eq!(cli.theme, Some(ThemeArg::Dark));
        assert_eq!(cli.viewport, Some(400));
        assert_eq!(cli.fade_out, Some(Duration::ZERO));
        assert!(!cli.dry_run);
    }

    #[test]
    fn rejects_zero_viewport() {
        assert!(Cli::try_parse_from(["toastify", "--viewport", "0"]).is_err());
    }
}
