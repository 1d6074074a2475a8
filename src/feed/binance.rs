//! Binance kline stream messages
//!
//! Numeric kline fields arrive as JSON strings, e.g.
//! `{"e":"kline","s":"BTCUSDT","k":{"c":"67432.17","v":"1.2","q":"80918.6","x":false}}`.

use serde::Deserialize;

use crate::error::FeedError;

/// Decoded kline fields the game cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kline {
    pub close: f64,
    /// Quote asset volume (turnover)
    pub quote_volume: f64,
    /// Kline interval has closed
    pub closed: bool,
}

#[derive(Debug, Deserialize)]
struct StreamMessage {
    k: Option<RawKline>,
}

#[derive(Debug, Deserialize)]
struct RawKline {
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "q", default)]
    quote_volume: Option<String>,
    #[serde(rename = "x", default)]
    closed: bool,
}

fn number(field: &'static str, value: &str) -> Result<f64, FeedError> {
    let parsed: f64 = value.trim().parse().map_err(|_| FeedError::BadNumber {
        field,
        value: value.to_string(),
    })?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(FeedError::NonFinite {
            field,
            value: parsed,
        });
    }
    Ok(parsed)
}

/// Decode one text frame from the kline stream
pub fn parse_kline(text: &str) -> Result<Kline, FeedError> {
    let message: StreamMessage = serde_json::from_str(text)?;
    let raw = message.k.ok_or(FeedError::MissingKline)?;
    Ok(Kline {
        close: number("c", &raw.close)?,
        quote_volume: raw
            .quote_volume
            .as_deref()
            .map_or(Ok(0.0), |q| number("q", q))?,
        closed: raw.closed,
    })
}

/// Stream name, e.g. `btcusdt@kline_1s`
pub fn stream_name(symbol: &str, interval: &str) -> String {
    format!("{}@kline_{}", symbol.to_lowercase(), interval)
}

/// Raw stream endpoint for a single symbol
pub fn stream_url(base: &str, symbol: &str, interval: &str) -> String {
    format!(
        "{}/ws/{}",
        base.trim_end_matches('/'),
        stream_name(symbol, interval)
    )
}

/// `SUBSCRIBE` request sent once the socket opens
pub fn subscribe_message(streams: &[String], id: u64) -> String {
    serde_json::json!({
        "method": "SUBSCRIBE",
        "params": streams,
        "id": id,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kline() {
        let text = r#"{"e":"kline","E":1,"s":"BTCUSDT","k":{"t":0,"c":"100.25","v":"2.5","q":"250.5","x":true}}"#;
        let kline = parse_kline(text).unwrap();
        assert_eq!(kline.close, 100.25);
        assert_eq!(kline.quote_volume, 250.5);
        assert!(kline.closed);
    }

    #[test]
    fn test_parse_kline_optional_volume() {
        let kline = parse_kline(r#"{"k":{"c":"7.5"}}"#).unwrap();
        assert_eq!(kline.close, 7.5);
        assert_eq!(kline.quote_volume, 0.0);
        assert!(!kline.closed);
    }

    #[test]
    fn test_parse_rejects_bad_messages() {
        assert!(matches!(parse_kline("not json"), Err(FeedError::Json(_))));
        assert!(matches!(
            parse_kline(r#"{"result":null,"id":1}"#),
            Err(FeedError::MissingKline)
        ));
        assert!(matches!(
            parse_kline(r#"{"k":{"c":"abc"}}"#),
            Err(FeedError::BadNumber { field: "c", .. })
        ));
        assert!(matches!(
            parse_kline(r#"{"k":{"c":"-3"}}"#),
            Err(FeedError::NonFinite { field: "c", .. })
        ));
        assert!(matches!(
            parse_kline(r#"{"k":{"c":"inf"}}"#),
            Err(FeedError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_stream_helpers() {
        assert_eq!(stream_name("BTCUSDT", "1s"), "btcusdt@kline_1s");
        assert_eq!(
            stream_url("wss://stream.binance.com:9443/", "BTCUSDT", "1s"),
            "wss://stream.binance.com:9443/ws/btcusdt@kline_1s"
        );
        let msg: serde_json::Value =
            serde_json::from_str(&subscribe_message(&[stream_name("BTCUSDT", "1s")], 1)).unwrap();
        assert_eq!(msg["method"], "SUBSCRIBE");
        assert_eq!(msg["params"][0], "btcusdt@kline_1s");
        assert_eq!(msg["id"], 1);
    }
}
