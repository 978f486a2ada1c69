use crate::api;
use crate::client::HistorianClient;
use crate::config::{Config, Endpoint};
use crate::decode_helpers::{parse_date, parse_date_time};
use crate::error::Result;
use crate::export::{export_table, TableFormat};
use crate::transport::Transport;
use crate::types::{Calculation, IntervalUnit, Query, TrendOptions};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ww-historian", version, about = "Query the WW process historian")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv, global = true)]
    pub format: OutputFormat,

    /// Print the session log to stderr when done
    #[arg(long, global = true)]
    pub show_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Text,
    Json,
    /// The response text as the historian sent it
    Raw,
}

impl OutputFormat {
    fn table_format(self) -> Option<TableFormat> {
        match self {
            OutputFormat::Csv => Some(TableFormat::Csv),
            OutputFormat::Text => Some(TableFormat::Text),
            OutputFormat::Json => Some(TableFormat::Json),
            OutputFormat::Raw => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current value of a tag
    CurrentValue { tag: String },
    /// Trend of a tag between two dates
    Trend(TrendArgs),
    /// Trend with one column per tag
    TrendPivot {
        #[command(flatten)]
        trend: TrendArgs,
        /// Leave out the time axis column
        #[arg(long)]
        no_time_axis: bool,
    },
    /// Value of a tag at a moment ("DD/MM/YYYY HH:MM" or "YYYY-MM-DDTHH:MM")
    TimeValue {
        tag: String,
        #[arg(value_parser = parse_date_time_arg)]
        timestamp: NaiveDateTime,
    },
    /// Lab results for a sample point and analysis code
    Lims {
        sample_point: String,
        analysis: String,
        #[arg(value_parser = parse_date_arg)]
        start: NaiveDate,
        #[arg(value_parser = parse_date_arg)]
        end: NaiveDate,
    },
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    /// Tag name, wildcards allowed
    pub tag: String,
    pub list: String,
    #[arg(value_parser = parse_date_arg)]
    pub start: NaiveDate,
    #[arg(value_parser = parse_date_arg)]
    pub end: NaiveDate,
    #[arg(long, default_value_t = 1)]
    pub interval: u32,
    /// days, hours, minutes or seconds
    #[arg(long, default_value = "days")]
    pub unit: IntervalUnit,
    /// actual, average, min, max, linear-interpolation or step-interpolation
    #[arg(long, default_value = "actual")]
    pub calc: Calculation,
}

impl TrendArgs {
    fn options(&self) -> TrendOptions {
        TrendOptions {
            interval: self.interval,
            unit: self.unit,
            calculation: self.calc,
        }
    }
}

fn parse_date_arg(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_date_time_arg(s: &str) -> std::result::Result<NaiveDateTime, String> {
    parse_date_time(s).map_err(|e| e.to_string())
}

impl Command {
    /// Endpoint and parameters this command sends.
    pub fn request(&self) -> (Endpoint, Query) {
        match self {
            Command::CurrentValue { tag } => (Endpoint::CurrentValue, api::current_value_query(tag)),
            Command::Trend(args) => (
                Endpoint::Trend,
                api::trend_query(&args.tag, &args.list, args.start, args.end, &args.options()),
            ),
            Command::TrendPivot {
                trend,
                no_time_axis,
            } => (
                Endpoint::TrendPivot,
                api::trend_pivot_query(
                    &trend.tag,
                    &trend.list,
                    trend.start,
                    trend.end,
                    &trend.options(),
                    !no_time_axis,
                ),
            ),
            Command::TimeValue { tag, timestamp } => {
                (Endpoint::TimeValue, api::time_value_query(tag, *timestamp))
            }
            Command::Lims {
                sample_point,
                analysis,
                start,
                end,
            } => (
                Endpoint::Lims,
                api::lims_query(sample_point, analysis, *start, *end),
            ),
        }
    }
}

/// Config file (if any), then environment, then `--base-url`.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut config = config.with_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

/// Runs one command and renders its result.
pub fn execute<T: Transport>(
    client: &HistorianClient<T>,
    command: &Command,
    format: OutputFormat,
) -> Result<String> {
    let Some(table_format) = format.table_format() else {
        let (endpoint, query) = command.request();
        return client.fetch_raw(endpoint, &query);
    };

    let table = match command {
        Command::CurrentValue { tag } => client.current_value(tag)?,
        Command::Trend(args) => {
            client.trend(&args.tag, &args.list, args.start, args.end, &args.options())?
        }
        Command::TrendPivot {
            trend,
            no_time_axis,
        } => client.trend_pivot(
            &trend.tag,
            &trend.list,
            trend.start,
            trend.end,
            &trend.options(),
            !no_time_axis,
        )?,
        Command::TimeValue { tag, timestamp } => client.time_value(tag, *timestamp)?,
        Command::Lims {
            sample_point,
            analysis,
            start,
            end,
        } => client.lims(sample_point, analysis, *start, *end)?,
    };

    export_table(&table, table_format)
}
