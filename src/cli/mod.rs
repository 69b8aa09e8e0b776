use std::{
    env,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
};

use chrono::Datelike;
use colored::Colorize;

use crate::{
    config::{Config, ConfigManager},
    core::{
        services::{
            weekday_headers, CalendarGrid, CalendarGridBuilder, DayCell, DayIndex, DayStatus,
            RecordService, ReportService, ServiceError,
        },
        Clock, SystemClock,
    },
    dates::{DateNormalizer, MonthRef},
    errors::{Result, WorklogError},
    storage::JsonRecordStore,
};

const USAGE: &str = "Usage: worklog_cli <command> [options]\n\
     Commands:\n  \
     summary    month totals and work rate\n  \
     calendar   month grid with worked days marked\n  \
     report     printable month report (--json for the export form)\n  \
     version    build information\n\
     Options:\n  \
     --month YYYY-MM   reference month (default: current)\n  \
     --data PATH       records snapshot (default: from config)\n  \
     --locale TAG      display locale (default: from config)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Summary,
    Calendar,
    Report { json: bool },
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: Command,
    pub month: Option<MonthRef>,
    pub data: Option<PathBuf>,
    pub locale: Option<String>,
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let command = match args.next().as_deref() {
            Some("summary") => Command::Summary,
            Some("calendar") => Command::Calendar,
            Some("report") => Command::Report { json: false },
            Some("version" | "--version") => Command::Version,
            Some(other) => return Err(usage(&format!("unknown command `{other}`"))),
            None => return Err(usage("missing command")),
        };
        let mut parsed = CliArgs {
            command,
            month: None,
            data: None,
            locale: None,
        };

        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .ok_or_else(|| usage(&format!("`{flag}` expects a value")))
            };
            match flag.as_str() {
                "--month" => {
                    let raw = value()?;
                    let month: MonthRef = raw
                        .parse()
                        .map_err(|_| usage(&format!("invalid month `{raw}`")))?;
                    parsed.month = Some(month);
                }
                "--data" => parsed.data = Some(PathBuf::from(value()?)),
                "--locale" => parsed.locale = Some(value()?),
                "--json" => match parsed.command {
                    Command::Report { .. } => parsed.command = Command::Report { json: true },
                    _ => return Err(usage("`--json` only applies to `report`")),
                },
                other => return Err(usage(&format!("unknown option `{other}`"))),
            }
        }
        Ok(parsed)
    }
}

fn usage(problem: &str) -> WorklogError {
    WorklogError::Usage(format!("{problem}\n{USAGE}"))
}

/// Entry point used by the `worklog_cli` binary.
pub fn run_cli() -> Result<()> {
    let args = CliArgs::parse(env::args().skip(1))?;
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    run(&args, &config, manager.base_dir(), &SystemClock, color, &mut out)
}

pub fn run<W: Write>(
    args: &CliArgs,
    config: &Config,
    base: &Path,
    clock: &dyn Clock,
    color: bool,
    out: &mut W,
) -> Result<()> {
    if args.command == Command::Version {
        writeln!(out, "{}", version_line())?;
        return Ok(());
    }

    let mut config = config.clone();
    if let Some(locale) = &args.locale {
        config.locale = locale.clone();
    }
    let path = args
        .data
        .clone()
        .unwrap_or_else(|| config.records_path(base));
    let month = args.month.unwrap_or_else(|| clock.current_month());

    let store = JsonRecordStore::open(&path)?;
    let normalizer = DateNormalizer::local();
    let work_days = RecordService::load_work_days(&store, &normalizer).map_err(flatten)?;
    let expenses = RecordService::load_expenses(&store, &normalizer).map_err(flatten)?;
    tracing::debug!(
        path = %path.display(),
        work_days = work_days.len(),
        expenses = expenses.len(),
        "records loaded"
    );

    let formatter = config.formatter();
    match args.command {
        Command::Summary => {
            let report = ReportService::monthly(&work_days, &expenses, month, &formatter);
            writeln!(out, "{}", report.title)?;
            for line in &report.summary_lines {
                writeln!(out, "{}: {}", line.label, line.value)?;
            }
        }
        Command::Calendar => {
            let index = DayIndex::for_month(&work_days, month);
            let grid = CalendarGridBuilder::build(month, &index, clock);
            write!(out, "{}", render_calendar(&grid, &config.locale, color))?;
        }
        Command::Report { json } => {
            let report = ReportService::monthly(&work_days, &expenses, month, &formatter);
            if json {
                writeln!(out, "{}", report.to_json()?)?;
            } else {
                write!(out, "{}", report.render_text())?;
            }
        }
        Command::Version => {}
    }
    Ok(())
}

fn flatten(err: ServiceError) -> WorklogError {
    match err {
        ServiceError::Worklog(inner) => inner,
        ServiceError::Invalid(message) => WorklogError::Usage(message),
    }
}

pub fn version_line() -> String {
    format!(
        "worklog_cli {} ({} {}, {} build, {})",
        env!("CARGO_PKG_VERSION"),
        env!("WORKLOG_BUILD_HASH"),
        env!("WORKLOG_BUILD_STATUS"),
        env!("WORKLOG_BUILD_PROFILE"),
        env!("WORKLOG_BUILD_TIMESTAMP"),
    )
}

/// Text grid: `*` worked, `!` today, `@` today and worked.
pub fn render_calendar(grid: &CalendarGrid, locale: &str, color: bool) -> String {
    let mut lines = vec![grid.month.label(locale)];
    let headers: Vec<String> = weekday_headers(locale)
        .iter()
        .map(|label| format!("{label:<3}"))
        .collect();
    lines.push(headers.join(" ").trim_end().to_string());
    for week in grid.weeks() {
        let cells: Vec<String> = week
            .iter()
            .map(|slot| match slot {
                Some(cell) => render_cell(cell, color),
                None => "   ".to_string(),
            })
            .collect();
        lines.push(cells.join(" ").trim_end().to_string());
    }
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

fn render_cell(cell: &DayCell, color: bool) -> String {
    let marker = match cell.status {
        DayStatus::Worked => '*',
        DayStatus::TodayWorked => '@',
        DayStatus::TodayNotWorked => '!',
        DayStatus::NotWorked => ' ',
    };
    let text = format!("{:>2}{marker}", cell.date.day());
    if !color {
        return text;
    }
    match cell.status {
        DayStatus::Worked => text.green().to_string(),
        DayStatus::TodayWorked => text.green().bold().underline().to_string(),
        DayStatus::TodayNotWorked => text.yellow().bold().to_string(),
        DayStatus::NotWorked => text.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_in_any_order() {
        let args = CliArgs::parse(["report", "--locale", "en-US", "--json", "--month", "2024-03"])
            .unwrap();
        assert_eq!(args.command, Command::Report { json: true });
        assert_eq!(args.month, MonthRef::new(2024, 3));
        assert_eq!(args.locale.as_deref(), Some("en-US"));
        assert!(args.data.is_none());
    }

    #[test]
    fn rejects_bad_input_with_usage() {
        for argv in [
            vec![],
            vec!["export"],
            vec!["summary", "--month"],
            vec!["summary", "--month", "March"],
            vec!["calendar", "--json"],
            vec!["summary", "--verbose"],
        ] {
            let err = CliArgs::parse(argv.clone()).unwrap_err();
            assert!(err.to_string().contains("Usage:"), "{argv:?}: {err}");
        }
    }
}
