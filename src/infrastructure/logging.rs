use std::{any::Any, backtrace::Backtrace, io, panic::Location};

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{config::AppConfig, infrastructure::directories::ResolvedPaths};

pub const LOG_FILE_NAME: &str = "course-watch.log";

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

pub fn init_tracing(config: &AppConfig, paths: &ResolvedPaths) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // Single file opened in append mode; earlier runs are kept.
        let file_appender = tracing_appender::rolling::never(&paths.logs_dir, LOG_FILE_NAME);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        let console_layer = fmt::layer()
            .with_writer(io::stdout)
            .with_target(true)
            .with_ansi(true);

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_ansi(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::info!(log_file = %paths.log_file.display(), "tracing initialized");
        Ok(())
    })?;
    Ok(())
}

/// Routes panics through tracing so the file log records where they happened
/// and the backtrace, even when the panic is later caught and recovered from.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        log_panic(info.payload(), info.location());
    }));
}

pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn log_panic(payload: &(dyn Any + Send), location: Option<&Location<'_>>) {
    let location = location
        .map(|loc| loc.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    let backtrace = Backtrace::force_capture();
    tracing::error!(
        target: "panic",
        panic = %panic_message(payload),
        %location,
        "thread panicked\n{backtrace}"
    );
}
