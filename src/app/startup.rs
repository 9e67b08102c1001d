//! Process startup and lifecycle

use std::io::IsTerminal;
use std::sync::Arc;

use clap::Parser;

use crate::app::cli::args::Args;
use crate::app::cli::config::{ConfigError, Settings};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{flush_logging, init_logging};
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::time::{SystemTimeProvider, TimeProvider};
use crate::core::version::long_version;
use crate::metrics::api::{serve, Collector};
use crate::sast::api::{SastApi, SastClient, TokenManager};

/// Exit status for configuration problems
pub const EXIT_CONFIG: i32 = 70;
/// Exit status for runtime failures
pub const EXIT_FAILURE: i32 = 1;

/// Initialize application startup
pub fn startup() {
    let args = Args::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: cannot start async runtime: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let status = runtime.block_on(run(args));
    flush_logging();
    if status != 0 {
        std::process::exit(status);
    }
}

/// Run the exporter until shutdown, returning the process exit status
pub async fn run(args: Args) -> i32 {
    // Stage 1: configuration file and command line
    let settings = match Settings::load(&args).await {
        Ok(settings) => settings,
        Err(e) => {
            // Settings never loaded, so log with whatever the command line asked for
            let level = args.log_level.as_deref().unwrap_or("info");
            let color = args.color_override().unwrap_or_else(stdout_is_terminal);
            if init_logging(level, args.log_format.unwrap_or_default(), None, color).is_err() {
                eprintln!("Error: {}", e);
            }
            log_error_with_context(&e, "Loading configuration");
            return EXIT_CONFIG;
        }
    };

    // Stage 2: logging
    let use_color = settings.color.unwrap_or_else(stdout_is_terminal);
    if let Err(e) = init_logging(
        &settings.log_level,
        settings.log_format,
        settings.log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: cannot initialise logging: {}", e);
        return EXIT_FAILURE;
    }
    log::info!("sastwatch {} starting", long_version());
    log::debug!("Effective settings: {:?}", settings);

    // Stage 3: validation
    if let Err(e) = settings.validate() {
        if let ConfigError::Invalid { problems, .. } = &e {
            for problem in problems {
                log::error!("{}", problem);
            }
        } else {
            log_error_with_context(&e, "Validating configuration");
        }
        return EXIT_CONFIG;
    }

    // Stage 4: collaborators
    let client = match SastClient::new(&settings.sast_settings()) {
        Ok(client) => client,
        Err(e) => {
            log_error_with_context(&e, "Creating SAST client");
            return EXIT_FAILURE;
        }
    };
    let api: Arc<dyn SastApi> = Arc::new(client);
    let clock: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let tokens = TokenManager::new(api.clone(), clock.clone(), settings.token_ttl());
    let collector = match Collector::new(api, tokens, clock) {
        Ok(collector) => Arc::new(collector),
        Err(e) => {
            log_error_with_context(&e, "Creating metrics registry");
            return EXIT_FAILURE;
        }
    };

    // Stage 5: serve until a signal arrives
    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();

    let status = match serve(
        &settings.listen_address,
        settings.listen_port,
        collector,
        &shutdown,
    )
    .await
    {
        Ok(()) => 0,
        Err(e) => {
            log_error_with_context(&e, "Serving metrics");
            EXIT_FAILURE
        }
    };

    log::info!("Service stopped");
    status
}

fn stdout_is_terminal() -> bool {
    std::io::stdout().is_terminal()
}
