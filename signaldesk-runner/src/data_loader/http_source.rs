//! Bar endpoint over blocking HTTP.
//!
//! `GET {base_url}/bars?symbol=&timeframe=&start=&end=` returning a JSON array
//! of bars. 404 means the symbol is unknown upstream. No retries: a failed
//! request surfaces immediately as `LoadError::Upstream`.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use signaldesk_core::domain::PriceBar;
use tracing::debug;

use super::{finalize_bars, parse_bar_date, BarSource, LoadError, Timeframe};

#[derive(Debug, Deserialize)]
struct WireBar {
    #[serde(alias = "ts", alias = "timestamp")]
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

pub struct HttpBarSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpBarSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("signaldesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LoadError::Upstream {
                symbol: String::new(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn bars_url(&self) -> String {
        format!("{}/bars", self.base_url)
    }

    fn upstream(symbol: &str, reason: impl Into<String>) -> LoadError {
        LoadError::Upstream {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

impl BarSource for HttpBarSource {
    fn name(&self) -> &str {
        "http"
    }

    fn load(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, LoadError> {
        let url = self.bars_url();
        debug!(symbol, %timeframe, %url, "requesting bars");

        let start_param = start.to_string();
        let end_param = end.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("timeframe", timeframe.as_str()),
                ("start", start_param.as_str()),
                ("end", end_param.as_str()),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    Self::upstream(symbol, format!("request timed out: {e}"))
                } else {
                    Self::upstream(symbol, format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound {
                symbol: symbol.to_string(),
                timeframe,
            });
        }
        if !status.is_success() {
            return Err(Self::upstream(symbol, format!("HTTP {status}")));
        }

        let wire: Vec<WireBar> = resp.json().map_err(|e| LoadError::Malformed {
            symbol: symbol.to_string(),
            reason: format!("failed to parse bar response: {e}"),
        })?;

        let mut bars = Vec::with_capacity(wire.len());
        for w in wire {
            let date = parse_bar_date(&w.date).ok_or_else(|| LoadError::Malformed {
                symbol: symbol.to_string(),
                reason: format!("bad date '{}'", w.date),
            })?;
            bars.push(PriceBar {
                date,
                open: w.open,
                high: w.high,
                low: w.low,
                close: w.close,
                volume: w.volume,
            });
        }
        finalize_bars(symbol, bars, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::d;
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let src = HttpBarSource::new("http://127.0.0.1:9000/", Duration::from_secs(1)).unwrap();
        assert_eq!(src.bars_url(), "http://127.0.0.1:9000/bars");
        assert_eq!(src.name(), "http");
    }

    #[test]
    fn unreachable_upstream_is_upstream_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let src = HttpBarSource::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = src
            .load("SPY", Timeframe::Day1, d("2024-01-01"), d("2024-01-31"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Upstream { .. }), "got {err:?}");
    }
}
