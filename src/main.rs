//! repl-bridge binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use repl_bridge::api::{serve, ApiKeyStore, AppState, RunResponse};
use repl_bridge::cli::{self, Args};
use repl_bridge::config::Config;
use repl_bridge::{logging, Executor, RunResult, Session};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'repl-bridge --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(2);
        }
    };

    let _ = logging::init_with_filter(config.log_filter());

    match run(&args, &config).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &Config) -> repl_bridge::Result<ExitCode> {
    let session = Arc::new(Session::new(config.to_session_config()));
    session.start()?;

    let executor = Executor::with_options(Arc::clone(&session), config.to_executor_options());

    let code = if args.serve {
        let server = config.to_server_config()?;
        let auth = ApiKeyStore::new(server.api_keys.clone());
        if !auth.is_enabled() {
            info!("API authentication disabled");
        }
        serve(server, AppState::with_auth(executor, auth), shutdown_signal()).await?;
        ExitCode::SUCCESS
    } else if !args.exec.is_empty() {
        let mut failed = false;
        for command in &args.exec {
            let result = executor.run(command, None).await;
            failed |= !result.ok;
            report(&result, args.json);
        }
        exit_code(failed)
    } else {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut failed = false;
        while let Some(command) = lines.next_line().await? {
            if command.trim().is_empty() {
                continue;
            }
            let result = executor.run(&command, None).await;
            failed |= !result.ok;
            report(&result, args.json);
        }
        exit_code(failed)
    };

    session.stop();
    Ok(code)
}

fn report(result: &RunResult, json: bool) {
    if json {
        match serde_json::to_string(&RunResponse::from_result(result, false)) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("failed to encode result: {}", e),
        }
        return;
    }

    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    if !result.ok {
        eprintln!("error: {}", result.errors);
    }
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
