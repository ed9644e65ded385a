// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use dts_api::{Api, ApiError, FileTokenStore, HttpTransport};
use dts_app::{ApiOutcome, AppState, LoginRedirect};
use runtime::{ApiRuntime, DemoRuntime};
use std::env;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "DTS_LOG";
const PASSWORD_ENV: &str = "DTS_PASSWORD";
const DEMO_SEED: u64 = 2026;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `dts --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let mut state = AppState::starting_on(config.start_screen());

    if options.demo {
        if options.check_only {
            return Ok(());
        }
        init_logging(&config, LogSink::File(config.log_file()?))?;
        info!("starting demo session");
        let mut runtime = DemoRuntime::new(DEMO_SEED);
        return dts_tui::run_app(&mut state, &mut runtime, config.page_size());
    }

    let token_path = config.token_path()?;
    let tokens = Arc::new(FileTokenStore::new(&token_path));
    let transport = HttpTransport::new(config.base_url(), config.timeout()?, tokens)
        .with_context(|| {
            format!(
                "invalid [server] config in {}; fix base_url/timeout values",
                options.config_path.display()
            )
        })?;
    let api = Api::new(transport);
    if options.check_only {
        return Ok(());
    }

    if let Some(username) = &options.login {
        init_logging(&config, LogSink::Stderr)?;
        let password = read_password()?;
        return login(&api, username, &password, &token_path);
    }

    if options.logout {
        init_logging(&config, LogSink::Stderr)?;
        return logout(&api);
    }

    if !api.is_signed_in()? {
        return Err(ApiError::MissingToken.into());
    }

    init_logging(&config, LogSink::File(config.log_file()?))?;
    info!(base_url = api.base_url(), "starting session");
    let mut runtime = ApiRuntime::new(api);
    dts_tui::run_app(&mut state, &mut runtime, config.page_size())
}

fn login(
    api: &Api<HttpTransport>,
    username: &str,
    password: &str,
    token_path: &Path,
) -> Result<()> {
    match api.login(username, password)? {
        ApiOutcome::Success(redirect) => {
            println!("signed in as {username}; token saved to {}", token_path.display());
            if redirect == LoginRedirect::MayorsPage {
                println!("this account lands on the mayor's page in the web client");
            }
            Ok(())
        }
        outcome => {
            let message = outcome
                .summary()
                .unwrap_or_else(|| "login rejected".to_owned());
            bail!("login failed: {message}")
        }
    }
}

fn logout(api: &Api<HttpTransport>) -> Result<()> {
    if !api.is_signed_in()? {
        println!("not signed in");
        return Ok(());
    }
    match api.logout() {
        Ok(()) => {}
        // The transport already dropped the stale token.
        Err(error) if error.needs_login() => {}
        Err(error) => return Err(error).context("sign out"),
    }
    println!("signed out");
    Ok(())
}

fn read_password() -> Result<String> {
    if let Ok(password) = env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    eprint!("password: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        bail!("no password given; pipe it on stdin or set {PASSWORD_ENV}");
    }
    Ok(password)
}

enum LogSink {
    Stderr,
    File(PathBuf),
}

fn init_logging(config: &Config, sink: LogSink) -> Result<()> {
    let filter = match env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {LOG_ENV} filter {directives:?}"))?,
        Err(_) => EnvFilter::try_new(config.log_level())
            .with_context(|| format!("invalid log.level {:?}", config.log_level()))?,
    };

    match sink {
        LogSink::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .without_time()
                    .with_ansi(false),
            )
            .try_init()
            .context("install logger")?,
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| {
                    format!(
                        "open log file {} -- set [log].file to a writable path",
                        path.display()
                    )
                })?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .try_init()
                .context("install logger")?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    login: Option<String>,
    logout: bool,
    demo: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        login: None,
        logout: false,
        demo: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--login" => {
                let value = iter
                    .next()
                    .filter(|value| !value.as_ref().starts_with('-'))
                    .ok_or_else(|| anyhow!("--login requires a username"))?;
                options.login = Some(value.as_ref().to_owned());
            }
            "--logout" => {
                options.logout = true;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.login.is_some() && options.logout {
        bail!("--login and --logout cannot be combined");
    }
    if options.demo && (options.login.is_some() || options.logout) {
        bail!("--demo runs offline; drop --login/--logout");
    }

    Ok(options)
}

fn print_help() {
    println!("dts: Document Tracking System terminal client");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --login <username>       Sign in (password from {PASSWORD_ENV} or stdin)");
    println!("  --logout                 Sign out and forget the saved token");
    println!("  --demo                   Launch with generated demo data (offline)");
    println!("  --check                  Validate config and server settings, then exit");
    println!("  --help                   Show this help");
}
