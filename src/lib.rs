pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod decode;
pub mod decode_helpers;
pub mod error;
pub mod export;
pub mod logbook;
pub mod transport;
pub mod types;

pub use client::HistorianClient;
pub use config::{Config, Endpoint, Endpoints};
pub use decode::{parse_response, parse_tables, ContentFormat};
pub use error::{Error, FailureKind, Malformed, Result};
pub use logbook::{LogEntry, Logbook};
pub use transport::{HttpResponse, HttpTransport, Transport};
pub use types::{Calculation, IntervalUnit, Query, Table, TrendOptions};
