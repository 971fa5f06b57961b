use clap::{ArgAction, Args, Parser, Subcommand};
use consul_utils::config::{SearchField, SideOverrides};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "0.3.0"
/// Format for dev builds: "0.3.0@abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

// `-h` is the Consul host, so help is long-only.
#[derive(Parser, Debug)]
#[command(
    name = "consul-utils",
    bin_name = "consul-utils",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Dump, search, diff and copy Consul key values", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (error, warn, info, debug, trace). RUST_LOG takes precedence
    #[arg(long, global = true, help_heading = "Options")]
    pub log_level: Option<String>,

    /// YAML configuration file
    #[arg(short = 'c', long, global = true, help_heading = "Options")]
    pub config_file: Option<PathBuf>,

    /// Print help
    #[arg(long, global = true, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dump every key under the root
    #[command(disable_help_flag = true)]
    Dump {
        #[command(flatten)]
        common: CommonArgs,

        /// Keep directory keys (ending in '/') in the output
        #[arg(long)]
        include_dirs: bool,
    },

    /// Search keys or values under the root
    #[command(disable_help_flag = true)]
    Search {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        search: SearchArgs,
    },

    /// Compare two roots, on one or two Consul instances
    #[command(disable_help_flag = true)]
    Diff {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        sides: DiffArgs,

        /// Also show keys whose values are identical
        #[arg(long)]
        with_same: bool,
    },

    /// Copy keys under the root to a target root
    #[command(disable_help_flag = true)]
    Copy {
        #[command(flatten)]
        common: CommonArgs,

        /// Root the keys are copied under
        #[arg(long, required = true)]
        target_root: String,

        /// Build the copy manifest without writing anything
        #[arg(long)]
        dry_run: bool,
    },
}

/// Connection and reporting flags shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct CommonArgs {
    /// Consul host
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Consul port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Consul scheme (http or https)
    #[arg(long)]
    pub scheme: Option<String>,

    /// Consul ACL token
    #[arg(short = 't', long)]
    pub token: Option<String>,

    /// Root key to read under
    #[arg(short = 'r', long)]
    pub root: Option<String>,

    /// Output type: text, csv or json
    #[arg(short = 'x', long)]
    pub output_type: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short = 'o', long)]
    pub output_file: Option<String>,

    /// Clear the local cache before fetching
    #[arg(long)]
    pub clear_cache: bool,

    /// Show the whole scan
    #[arg(long)]
    pub show_all: bool,

    /// Show keys the filter rejected
    #[arg(long)]
    pub show_non_filtered: bool,

    /// Show filter results (hit counts, copy manifest)
    #[arg(long)]
    pub show_flags: bool,

    /// Hide keys the filter passed
    #[arg(long)]
    pub hide_filtered: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SearchArgs {
    /// Text or pattern to look for
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Treat the query as a regular expression
    #[arg(short = 'e', long)]
    pub regex: bool,

    /// Search keys or values
    #[arg(short = 'f', long)]
    pub fields: Option<SearchField>,

    /// Stop after this many hits
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

/// Per-side overrides for diff. Unset values fall back to the shared flags.
#[derive(Args, Debug, Default, Clone)]
pub struct DiffArgs {
    /// Host of the first side
    #[arg(long)]
    pub host1: Option<String>,
    /// Port of the first side
    #[arg(long)]
    pub port1: Option<u16>,
    /// Scheme of the first side
    #[arg(long)]
    pub scheme1: Option<String>,
    /// Token of the first side
    #[arg(long)]
    pub token1: Option<String>,
    /// Root of the first side
    #[arg(long)]
    pub root1: Option<String>,

    /// Host of the second side
    #[arg(long)]
    pub host2: Option<String>,
    /// Port of the second side
    #[arg(long)]
    pub port2: Option<u16>,
    /// Scheme of the second side
    #[arg(long)]
    pub scheme2: Option<String>,
    /// Token of the second side
    #[arg(long)]
    pub token2: Option<String>,
    /// Root of the second side
    #[arg(long)]
    pub root2: Option<String>,
}

impl DiffArgs {
    pub fn left(&self) -> SideOverrides {
        SideOverrides {
            host: self.host1.clone(),
            port: self.port1,
            scheme: self.scheme1.clone(),
            token: self.token1.clone(),
            root: self.root1.clone(),
        }
    }

    pub fn right(&self) -> SideOverrides {
        SideOverrides {
            host: self.host2.clone(),
            port: self.port2,
            scheme: self.scheme2.clone(),
            token: self.token2.clone(),
            root: self.root2.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_short_connection_flags() {
        let cli = Cli::try_parse_from([
            "consul-utils", "dump", "-h", "consul.local", "-p", "8501", "-r", "app/", "-x", "json",
        ])
        .unwrap();
        match cli.command {
            Commands::Dump {
                common,
                include_dirs,
            } => {
                assert_eq!(common.host.as_deref(), Some("consul.local"));
                assert_eq!(common.port, Some(8501));
                assert_eq!(common.root.as_deref(), Some("app/"));
                assert_eq!(common.output_type.as_deref(), Some("json"));
                assert!(!include_dirs);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from([
            "consul-utils", "search", "-q", "^db", "-e", "-f", "values", "-l", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Search { search, .. } => {
                assert_eq!(search.query.as_deref(), Some("^db"));
                assert!(search.regex);
                assert_eq!(search.fields, Some(SearchField::Values));
                assert_eq!(search.limit, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_search_field() {
        assert!(Cli::try_parse_from(["consul-utils", "search", "-f", "both"]).is_err());
    }

    #[test]
    fn parses_diff_sides() {
        let cli = Cli::try_parse_from([
            "consul-utils", "diff", "--root1", "prod/", "--host2", "stage", "--root2", "prod/",
            "--with-same",
        ])
        .unwrap();
        match cli.command {
            Commands::Diff {
                sides, with_same, ..
            } => {
                assert!(with_same);
                assert_eq!(sides.left().root.as_deref(), Some("prod/"));
                assert_eq!(sides.left().host, None);
                assert_eq!(sides.right().host.as_deref(), Some("stage"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn copy_requires_target_root() {
        assert!(Cli::try_parse_from(["consul-utils", "copy", "-r", "a/"]).is_err());
        let cli = Cli::try_parse_from([
            "consul-utils", "copy", "-r", "a/", "--target-root", "b/", "--dry-run",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Copy { ref target_root, dry_run: true, .. } if target_root == "b/"
        ));
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "consul-utils", "dump", "--log-level", "debug", "-c", "conf.yaml",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.config_file, Some(PathBuf::from("conf.yaml")));
    }
}
