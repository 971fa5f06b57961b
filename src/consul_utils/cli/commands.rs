use super::print::print_messages;
use super::setup::{Cli, Commands, CommonArgs, SearchArgs};
use clap::Parser;
use consul_utils::api::ConsulUtilsApi;
use consul_utils::commands::CmdResult;
use consul_utils::config::{Settings, SideOverrides};
use consul_utils::error::{ConsulUtilsError, Result};
use consul_utils::store::ConsulStoreFactory;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

type Api = ConsulUtilsApi<ConsulStoreFactory>;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::discover(cli.config_file.as_deref())?;
    if let Some(level) = &cli.log_level {
        settings.log.level = level.clone();
    }
    init_logging(&settings.log.level);

    match cli.command {
        Commands::Dump {
            common,
            include_dirs,
        } => {
            let api = build_api(settings, &common);
            prepare(&api, &common, &[])?;
            finish(&api, api.dump(include_dirs)?)
        }
        Commands::Search { common, search } => {
            apply_search_args(&mut settings, &search);
            let api = build_api(settings, &common);
            prepare(&api, &common, &[])?;
            finish(&api, api.search()?)
        }
        Commands::Diff {
            common,
            sides,
            with_same,
        } => {
            if with_same {
                settings.reporter.show_non_filtered = true;
            }
            let api = build_api(settings, &common);
            let (left, right) = (sides.left(), sides.right());
            prepare(&api, &common, &[left.clone(), right.clone()])?;
            finish(&api, api.diff(&left, &right)?)
        }
        Commands::Copy {
            common,
            target_root,
            dry_run,
        } => {
            let api = build_api(settings, &common);
            if api.settings().default_root.is_empty() {
                return Err(ConsulUtilsError::Config(
                    "Copy needs a source root (--root)".to_string(),
                ));
            }
            prepare(&api, &common, &[])?;
            finish(&api, api.copy(&target_root, dry_run)?)
        }
    }
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn build_api(mut settings: Settings, common: &CommonArgs) -> Api {
    apply_common_args(&mut settings, common);
    tracing::debug!(
        consul = %settings.consul.base_url(),
        root = %settings.default_root,
        "resolved settings"
    );
    ConsulUtilsApi::new(ConsulStoreFactory, settings)
}

/// Fail on a bad output type before touching Consul, then clear the cache
/// when asked.
fn prepare(api: &Api, common: &CommonArgs, sides: &[SideOverrides]) -> Result<()> {
    api.renderer()?;
    if common.clear_cache {
        let result = api.clear_cache(sides)?;
        print_messages(&result.messages);
    }
    Ok(())
}

fn finish(api: &Api, result: CmdResult) -> Result<()> {
    api.report(&result)?;
    print_messages(&result.messages);
    Ok(())
}

/// Flags override whatever the config file said.
fn apply_common_args(settings: &mut Settings, common: &CommonArgs) {
    if let Some(host) = &common.host {
        settings.consul.host = host.clone();
    }
    if let Some(port) = common.port {
        settings.consul.port = port;
    }
    if let Some(scheme) = &common.scheme {
        settings.consul.scheme = scheme.clone();
    }
    if let Some(token) = &common.token {
        settings.consul.token = token.clone();
    }
    if let Some(root) = &common.root {
        settings.default_root = root.clone();
    }
    if let Some(output_type) = &common.output_type {
        settings.reporter.output_type = output_type.clone();
    }
    if let Some(output_file) = &common.output_file {
        settings.reporter.output_file = output_file.clone();
    }
    let reporter = &mut settings.reporter;
    reporter.show_all_scan |= common.show_all;
    reporter.show_non_filtered |= common.show_non_filtered;
    reporter.show_flags |= common.show_flags;
    if common.hide_filtered {
        reporter.show_filtered = false;
    }
}

fn apply_search_args(settings: &mut Settings, search: &SearchArgs) {
    if let Some(query) = &search.query {
        settings.search.query = Some(query.clone());
    }
    settings.search.regex |= search.regex;
    if let Some(fields) = search.fields {
        settings.search.fields = fields;
    }
    if let Some(limit) = search.limit {
        settings.search.limit = limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consul_utils::config::SearchField;

    #[test]
    fn flags_override_settings() {
        let mut settings = Settings::default();
        settings.consul.host = "from-file".to_string();
        settings.consul.token = "file-token".to_string();
        let common = CommonArgs {
            host: Some("from-flag".to_string()),
            port: Some(9500),
            root: Some("svc/".to_string()),
            output_type: Some("csv".to_string()),
            show_flags: true,
            hide_filtered: true,
            ..CommonArgs::default()
        };
        apply_common_args(&mut settings, &common);

        assert_eq!(settings.consul.host, "from-flag");
        assert_eq!(settings.consul.port, 9500);
        assert_eq!(settings.consul.token, "file-token");
        assert_eq!(settings.default_root, "svc/");
        assert_eq!(settings.reporter.output_type, "csv");
        assert!(settings.reporter.show_flags);
        assert!(!settings.reporter.show_filtered);
        assert!(!settings.reporter.show_all_scan);
    }

    #[test]
    fn unset_flags_keep_file_values() {
        let mut settings = Settings::default();
        settings.reporter.show_non_filtered = true;
        settings.search.regex = true;
        apply_common_args(&mut settings, &CommonArgs::default());
        apply_search_args(&mut settings, &SearchArgs::default());
        assert!(settings.reporter.show_non_filtered);
        assert!(settings.reporter.show_filtered);
        assert!(settings.search.regex);
        assert_eq!(settings.search.limit, 10);
    }

    #[test]
    fn search_flags_override_settings() {
        let mut settings = Settings::default();
        apply_search_args(
            &mut settings,
            &SearchArgs {
                query: Some("db".to_string()),
                regex: false,
                fields: Some(SearchField::Values),
                limit: Some(2),
            },
        );
        assert_eq!(settings.search.query.as_deref(), Some("db"));
        assert_eq!(settings.search.fields, SearchField::Values);
        assert_eq!(settings.search.limit, 2);
    }
}
