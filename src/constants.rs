use std::time::Duration;

// Response markers
pub const ERROR_PAGE_MARKER: &str = "<title>Error</title>";
pub const BAD_ROW_SENTINEL: &str = "Bad";
pub const FIELD_SEPARATOR: char = '\t';
pub const LINE_SEPARATOR: char = '\n';
pub const CARRIAGE_RETURN: char = '\r';

// Browsers clamp larger colspan values to this
pub const MAX_COLSPAN: usize = 1000;

// Wire formats for date parameters
pub const DATE_FORMAT: &str = "%d-%m-%Y";
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Query parameter names understood by the historian
pub mod params {
    pub const TAG_NAME: &str = "tagnaam";
    pub const LIST_NAME: &str = "lijst";
    pub const START_TIME: &str = "starttijd";
    pub const END_TIME: &str = "eindtijd";
    pub const PERIOD: &str = "periode";
    pub const PERIOD_UNIT: &str = "periode eenheid";
    pub const CALCULATION: &str = "calculatie";
    pub const TIME_AXIS: &str = "tijdsas";
    pub const TIMESTAMP: &str = "timestamp";
    pub const SAMPLE_POINT: &str = "monsterpunt";
    pub const ANALYSIS: &str = "analyse";
}

// Default configuration
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_BASE_URL: &str = "http://localhost/ww/";

pub const DEFAULT_CURRENT_VALUE_PATH: &str = "GetCurrVal.aspx";
pub const DEFAULT_TREND_PATH: &str = "GetTrend.aspx";
pub const DEFAULT_TREND_PIVOT_PATH: &str = "GetTrendPivot.aspx";
pub const DEFAULT_TIME_VALUE_PATH: &str = "GetTimeVal.aspx";
pub const DEFAULT_LIMS_PATH: &str = "GetLims.aspx";

pub const ENV_BASE_URL: &str = "WW_BASE_URL";
pub const ENV_TIMEOUT: &str = "WW_TIMEOUT";

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
