//! Typed operations for each historian query page.
//! Each one formats its arguments into a [`Query`] and hands it to the client.

use crate::client::HistorianClient;
use crate::config::Endpoint;
use crate::constants::params;
use crate::decode_helpers::{format_date, format_date_time};
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{Query, Table, TrendOptions};
use chrono::{NaiveDate, NaiveDateTime};

pub fn current_value_query(tag: &str) -> Query {
    Query::new().with(params::TAG_NAME, tag)
}

pub fn trend_query(
    tag: &str,
    list: &str,
    start: NaiveDate,
    end: NaiveDate,
    options: &TrendOptions,
) -> Query {
    Query::new()
        .with(params::TAG_NAME, tag)
        .with(params::LIST_NAME, list)
        .with(params::START_TIME, format_date(start))
        .with(params::END_TIME, format_date(end))
        .with(params::PERIOD, options.interval)
        .with(params::PERIOD_UNIT, options.unit)
        .with(params::CALCULATION, options.calculation)
}

pub fn trend_pivot_query(
    tag: &str,
    list: &str,
    start: NaiveDate,
    end: NaiveDate,
    options: &TrendOptions,
    time_axis: bool,
) -> Query {
    trend_query(tag, list, start, end, options).with(params::TIME_AXIS, u8::from(time_axis))
}

pub fn time_value_query(tag: &str, timestamp: NaiveDateTime) -> Query {
    Query::new()
        .with(params::TAG_NAME, tag)
        .with(params::TIMESTAMP, format_date_time(timestamp))
}

pub fn lims_query(sample_point: &str, analysis: &str, start: NaiveDate, end: NaiveDate) -> Query {
    Query::new()
        .with(params::SAMPLE_POINT, sample_point)
        .with(params::ANALYSIS, analysis)
        .with(params::START_TIME, format_date(start))
        .with(params::END_TIME, format_date(end))
}

impl<T: Transport> HistorianClient<T> {
    /// Current value of a tag.
    pub fn current_value(&self, tag: &str) -> Result<Table> {
        self.query(Endpoint::CurrentValue, &current_value_query(tag))
    }

    /// Trend of a tag between two dates. The tag may contain wildcards.
    pub fn trend(
        &self,
        tag: &str,
        list: &str,
        start: NaiveDate,
        end: NaiveDate,
        options: &TrendOptions,
    ) -> Result<Table> {
        self.query(
            Endpoint::Trend,
            &trend_query(tag, list, start, end, options),
        )
    }

    /// Trend with one column per tag.
    pub fn trend_pivot(
        &self,
        tag: &str,
        list: &str,
        start: NaiveDate,
        end: NaiveDate,
        options: &TrendOptions,
        time_axis: bool,
    ) -> Result<Table> {
        self.query(
            Endpoint::TrendPivot,
            &trend_pivot_query(tag, list, start, end, options, time_axis),
        )
    }

    /// Value of a tag at a moment, to the minute.
    pub fn time_value(&self, tag: &str, timestamp: NaiveDateTime) -> Result<Table> {
        self.query(Endpoint::TimeValue, &time_value_query(tag, timestamp))
    }

    /// Lab results for a sample point and analysis code.
    pub fn lims(
        &self,
        sample_point: &str,
        analysis: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Table> {
        self.query(
            Endpoint::Lims,
            &lims_query(sample_point, analysis, start, end),
        )
    }
}
