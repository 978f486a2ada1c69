use crate::config::{Config, Endpoint};
use crate::constants::{ERROR_PAGE_MARKER, VERSION};
use crate::decode::DecoderContext;
use crate::error::{Error, Result};
use crate::logbook::Logbook;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Query, Table};
use tracing::debug;
use url::Url;

/// Blocking client for the WW historian.
///
/// Every request, and every failure, is recorded in the client's [`Logbook`].
/// Nothing is retried: a failed call is final and is returned to the caller.
pub struct HistorianClient<T = HttpTransport> {
    transport: T,
    config: Config,
    logbook: Logbook,
}

impl HistorianClient<HttpTransport> {
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> HistorianClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        let logbook = Logbook::new();
        logbook.append(format!("initialized ww-historian {}", VERSION));
        Self {
            transport,
            config,
            logbook,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }

    /// The session log as `<timestamp>: <message>` lines.
    pub fn dump_log(&self) -> String {
        self.logbook.dump()
    }

    /// Appends the form-urlencoded query to `base_url`.
    pub fn build_url(base_url: &str, query: &Query) -> Result<Url> {
        if base_url.trim().is_empty() {
            return Err(Error::InvalidRequest("Base URL cannot be empty".to_string()));
        }

        let mut url = Url::parse(base_url)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                query
                    .pairs()
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }
        Ok(url)
    }

    /// Sends one GET and returns the response text.
    ///
    /// Fails on transport errors, non-2xx statuses, bodies that are not UTF-8
    /// and error pages the server renders with a 200 status.
    pub fn fetch(&self, base_url: &str, query: &Query) -> Result<String> {
        let url = match Self::build_url(base_url, query) {
            Ok(url) => url,
            Err(e) => {
                self.logbook.warn(format!("could not build request URL: {}", e));
                return Err(e);
            }
        };

        self.logbook.append(format!("starting request to {}", url));

        let response = match self.transport.get(&url) {
            Ok(response) => response,
            Err(e) => {
                self.logbook.warn(format!("request to {} failed: {}", url, e));
                return Err(e);
            }
        };

        if !response.status.is_success() {
            let body = String::from_utf8_lossy(&response.body).into_owned();
            self.logbook
                .warn(format!("Got statuscode {}", response.status.as_u16()));
            self.logbook.warn(body.clone());
            return Err(Error::HttpStatus {
                status: response.status,
                body,
            });
        }

        let text = match String::from_utf8(response.body) {
            Ok(text) => text,
            Err(e) => {
                self.logbook
                    .warn(format!("response is not valid UTF-8: {}", e));
                return Err(e.into());
            }
        };

        if text.contains(ERROR_PAGE_MARKER) {
            self.logbook.warn("Got error status from the server");
            return Err(Error::ServerErrorPage);
        }

        debug!("Received {} bytes from {}", text.len(), url);
        self.logbook
            .append(format!("received {} bytes", text.len()));
        Ok(text)
    }

    /// Unparsed response text of one endpoint.
    pub fn fetch_raw(&self, endpoint: Endpoint, query: &Query) -> Result<String> {
        let url = match self.config.endpoint_url(endpoint) {
            Ok(url) => url,
            Err(e) => {
                self.logbook
                    .warn(format!("no URL for {:?}: {}", endpoint, e));
                return Err(e);
            }
        };
        self.fetch(url.as_str(), query)
    }

    /// Fetches one endpoint and parses the first table of the response.
    pub fn query(&self, endpoint: Endpoint, query: &Query) -> Result<Table> {
        let text = self.fetch_raw(endpoint, query)?;
        let table = DecoderContext::with_logbook(&self.logbook).decode_response(&text);
        self.note_parse_failure(table)
    }

    /// Fetches one endpoint and parses every table of the response.
    pub fn query_tables(&self, endpoint: Endpoint, query: &Query) -> Result<Vec<Table>> {
        let text = self.fetch_raw(endpoint, query)?;
        let tables = DecoderContext::with_logbook(&self.logbook).decode_tables(&text);
        self.note_parse_failure(tables)
    }

    fn note_parse_failure<R>(&self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            // Data errors were already written by the decoder.
            if !matches!(e, Error::BadData { .. }) {
                self.logbook.warn(format!("could not parse response: {}", e));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::transport::HttpResponse;
    use parking_lot::Mutex;
    use reqwest::StatusCode;

    /// Answers every request with the same canned response.
    struct CannedTransport {
        status: StatusCode,
        body: Vec<u8>,
        requests: Mutex<Vec<Url>>,
    }

    impl CannedTransport {
        fn new(status: StatusCode, body: &[u8]) -> Self {
            Self {
                status,
                body: body.to_vec(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        fn get(&self, url: &Url) -> Result<HttpResponse> {
            self.requests.lock().push(url.clone());
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn client(status: StatusCode, body: &[u8]) -> HistorianClient<CannedTransport> {
        HistorianClient::with_transport(
            Config::new("http://historian.test/ww/"),
            CannedTransport::new(status, body),
        )
    }

    #[test]
    fn test_build_url_round_trips_query() {
        let query = Query::new()
            .with("tagnaam", "2W325KM01*")
            .with("periode eenheid", "dagen")
            .with("timestamp", "12/05/2016 19:00")
            .with("lijst", "GAS-DW-VD&co=ï");

        let url = HistorianClient::<CannedTransport>::build_url("http://h/ww/GetTrend.aspx", &query)
            .unwrap();
        let decoded: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(decoded, query.pairs().to_vec());
        assert!(url.as_str().contains("periode+eenheid=dagen"));
    }

    #[test]
    fn test_build_url_without_params() {
        let url =
            HistorianClient::<CannedTransport>::build_url("http://h/ww/x.aspx", &Query::new())
                .unwrap();
        assert_eq!(url.as_str(), "http://h/ww/x.aspx");
        assert!(HistorianClient::<CannedTransport>::build_url("", &Query::new()).is_err());
    }

    #[test]
    fn test_fetch_returns_text_and_logs_url() {
        let client = client(StatusCode::OK, b"a\tb\n1\t2");
        let text = client
            .fetch("http://historian.test/ww/x.aspx", &Query::new().with("tagnaam", "T1"))
            .unwrap();

        assert_eq!(text, "a\tb\n1\t2");
        assert!(client
            .dump_log()
            .contains("starting request to http://historian.test/ww/x.aspx?tagnaam=T1"));
    }

    #[test]
    fn test_http_error_status_is_logged() {
        let client = client(StatusCode::INTERNAL_SERVER_ERROR, b"boom");
        let err = client
            .fetch("http://historian.test/ww/x.aspx", &Query::new())
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        let log = client.dump_log();
        assert!(log.contains("Got statuscode 500"));
        assert!(log.contains(": boom"));
    }

    #[test]
    fn test_error_page_is_not_parsed() {
        let body = b"<html><head><title>Error</title></head><body><table><tr><td>x</td></tr></table></body></html>";
        let client = client(StatusCode::OK, body);
        let err = client.query(Endpoint::CurrentValue, &Query::new()).unwrap_err();

        assert!(matches!(err, Error::ServerErrorPage));
        assert!(!client.dump_log().contains("could not parse"));
    }

    #[test]
    fn test_unparsable_url_is_logged() {
        let client = client(StatusCode::OK, b"a\n1");
        let before = client.logbook().len();

        let err = client.fetch("not a url", &Query::new()).unwrap_err();

        assert_eq!(err.kind(), FailureKind::InvalidRequest);
        assert_eq!(client.logbook().len(), before + 1);
        assert!(client.dump_log().contains("could not build request URL"));
        assert!(client.transport.requests.lock().is_empty());
    }

    #[test]
    fn test_missing_base_url_is_logged() {
        let client = HistorianClient::with_transport(
            Config::new("  "),
            CannedTransport::new(StatusCode::OK, b"a\n1"),
        );
        let before = client.logbook().len();

        let err = client
            .query(Endpoint::CurrentValue, &Query::new().with("tagnaam", "T1"))
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Config);
        assert_eq!(client.logbook().len(), before + 1);
        assert!(client.dump_log().contains("no URL for CurrentValue"));
        assert!(client.transport.requests.lock().is_empty());
    }

    #[test]
    fn test_invalid_utf8_body() {
        let client = client(StatusCode::OK, &[0x61, 0xff, 0xfe]);
        let err = client
            .fetch("http://historian.test/ww/x.aspx", &Query::new())
            .unwrap_err();
        assert!(matches!(err, Error::Utf8(_)));
    }

    #[test]
    fn test_query_logs_malformed_responses() {
        let client = client(StatusCode::OK, b"a\tb\n1");
        let err = client.query(Endpoint::Trend, &Query::new()).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
        assert!(client.dump_log().contains("could not parse response"));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failure_is_traced_once() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();

        let client = client(StatusCode::OK, b"a\tb\n1");
        tracing::subscriber::with_default(subscriber, || {
            let _ = client.query(Endpoint::Trend, &Query::new());
        });

        let output = String::from_utf8(captured.0.lock().clone()).unwrap();
        let warnings: Vec<&str> = output.lines().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "{}", output);
        assert!(warnings[0].contains("could not parse response"));
    }

    #[test]
    fn test_query_uses_configured_endpoint() {
        let client = client(StatusCode::OK, b"a\n1");
        client
            .query(Endpoint::TrendPivot, &Query::new().with("tijdsas", 1))
            .unwrap();

        let requests = client.transport.requests.lock();
        assert_eq!(
            requests[0].as_str(),
            "http://historian.test/ww/GetTrendPivot.aspx?tijdsas=1"
        );
    }

    #[test]
    fn test_log_grows_with_every_call() {
        let client = client(StatusCode::OK, b"a\tBad\nx\tBad");
        let before = client.logbook().len();
        for _ in 0..5 {
            let _ = client.query(Endpoint::CurrentValue, &Query::new());
        }
        let entries = client.logbook().entries();
        assert!(entries.len() >= before + 5);
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
