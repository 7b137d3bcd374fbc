//! Log line layout: wall-clock time, simulation tick, level, span chain, target, fields.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

/// Ticks run by the app loop so far.
static TICKS: AtomicU64 = AtomicU64::new(0);

/// Ticks are printed as four hex digits.
const TICK_MASK: u64 = 0xFFFF;

const TIMESTAMP: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:4]");

/// ANSI styling applied only when the writer supports escapes.
#[derive(Clone, Copy)]
enum Style {
    Dim,
    Bold,
    Color(&'static str),
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Dim => "\x1b[2m",
            Style::Bold => "\x1b[1m",
            Style::Color(code) => code,
        }
    }

    fn write(self, writer: &mut Writer<'_>, value: impl fmt::Display) -> fmt::Result {
        if writer.has_ansi_escapes() {
            write!(writer, "{}{value}\x1b[0m", self.code())
        } else {
            write!(writer, "{value}")
        }
    }
}

fn level_style(level: &Level) -> (Style, &'static str) {
    match *level {
        Level::TRACE => (Style::Color("\x1b[35m"), "TRACE"),
        Level::DEBUG => (Style::Color("\x1b[34m"), "DEBUG"),
        Level::INFO => (Style::Color("\x1b[32m"), " INFO"),
        Level::WARN => (Style::Color("\x1b[33m"), " WARN"),
        Level::ERROR => (Style::Color("\x1b[31m"), "ERROR"),
    }
}

/// Event formatter that prefixes every line with the current simulation tick.
///
/// A tick is one `Game::tick`, so lines from the same frame share a prefix.
pub struct TickFormatter;

impl<S, N> FormatEvent<S, N> for TickFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP).map_err(|_| fmt::Error)?;
        Style::Dim.write(&mut writer, timestamp)?;
        writer.write_char(' ')?;

        Style::Dim.write(&mut writer, format_args!("0x{:04X}", tick_count() & TICK_MASK))?;
        writer.write_char(' ')?;

        let (style, label) = level_style(meta.level());
        style.write(&mut writer, label)?;
        writer.write_char(' ')?;

        if let Some(scope) = ctx.event_scope() {
            let mut any = false;
            for span in scope.from_root() {
                any = true;
                Style::Bold.write(&mut writer, span.metadata().name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>().filter(|f| !f.is_empty()) {
                    Style::Bold.write(&mut writer, "{")?;
                    write!(writer, "{fields}")?;
                    Style::Bold.write(&mut writer, "}")?;
                }
                Style::Dim.write(&mut writer, ':')?;
            }
            if any {
                writer.write_char(' ')?;
            }
        }

        Style::Dim.write(&mut writer, format_args!("{}:", meta.target()))?;
        writer.write_char(' ')?;

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Advances the tick shown in log lines. Called once per app loop iteration.
pub fn increment_tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

pub fn tick_count() -> u64 {
    TICKS.load(Ordering::Relaxed)
}
