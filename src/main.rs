use clap::Parser;
use kube_state_options::{cli::Args, config::Config, Result};
use std::{error::Error as _, fmt, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Args) {
    let directive = if args.verbose {
        args.log_level.clone()
    } else {
        format!("{}={}", env!("CARGO_CRATE_NAME"), args.log_level)
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn show<T: fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn run(args: Args) -> Result<()> {
    let file = match &args.config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let options = file.merge(args.options);
    options.validate()?;

    info!(
        resources = %show(&options.resources),
        namespaces = %show(&options.namespaces),
        namespace_selector = %options.namespace_field_selector(),
        metric_allowlist = %show(&options.metric_allowlist),
        metric_denylist = %show(&options.metric_denylist),
        metric_labels_allowlist = %show(&options.metric_labels_allowlist),
        "effective options"
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}
