//! Logging setup: console output plus a plain `[LEVEL] message` log file.

use std::fmt;
use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::{DefaultFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Registry, fmt as fmt_layer};

use crate::Error;
use crate::config::Config;

/// Log file layer type returned by [`log_file_layer`].
pub type LogFileLayer<S> = fmt_layer::Layer<S, DefaultFields, LevelPrefixed, RollingFileAppender>;

/// Installs the global subscriber.
///
/// The console layer honours `RUST_LOG` (default `info`). The log file
/// always receives INFO and above. A failed write to the log file is
/// reported on stderr by the fmt layer and otherwise ignored.
pub fn init(config: &Config) -> Result<(), Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = log_file_layer::<Registry>(&config.log_path)?;

    tracing_subscriber::registry()
        .with(log_file.with_filter(LevelFilter::INFO))
        .with(
            fmt_layer::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_filter(env_filter),
        )
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Builds a layer appending one `[LEVEL] message` line per event to `path`.
///
/// The file is never rotated. Fails if the file or its directory cannot be
/// created.
pub fn log_file_layer<S>(path: &Path) -> Result<LogFileLayer<S>, Error>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Logging(format!("log path {} has no file name", path.display())))?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| Error::Logging(format!("cannot open {}: {}", path.display(), e)))?;

    Ok(fmt_layer::layer()
        .with_ansi(false)
        .event_format(LevelPrefixed)
        .with_writer(appender))
}

/// Event format rendering `[LEVEL] message key=value`.
#[derive(Debug)]
pub struct LevelPrefixed;

impl<S, N> FormatEvent<S, N> for LevelPrefixed
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
