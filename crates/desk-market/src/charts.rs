//! Chart figures as plain serializable data
//!
//! The JSON shape follows Plotly's `{data, layout}` figure format so the
//! dashboard can hand it straight to `Plotly.newPlot`. Builders return `None`
//! when there is nothing to draw.

use crate::types::PriceBar;
use serde::{Deserialize, Serialize};

/// A complete figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// One trace of a figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        name: String,
    },
    Bar {
        x: Vec<String>,
        y: Vec<f64>,
        name: String,
        marker: Marker,
    },
    Indicator {
        mode: String,
        value: f64,
        title: Title,
        gauge: Gauge,
    },
    Pie {
        labels: Vec<String>,
        values: Vec<f64>,
        marker: PieMarker,
        textinfo: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub color: String,
}

/// Pie slices take one color each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieMarker {
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub axis: GaugeAxis,
    pub bar: Marker,
    pub steps: Vec<GaugeStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeAxis {
    pub range: [f64; 2],
}

/// A colored band on the gauge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeStep {
    pub range: [f64; 2],
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub title: Title,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    pub height: u32,
}

fn date_axis(rangeslider: Option<RangeSlider>) -> Axis {
    Axis {
        title: Title::new("Date"),
        rangeslider,
    }
}

fn dates(bars: &[PriceBar]) -> Vec<String> {
    bars.iter()
        .map(|bar| bar.date.format("%Y-%m-%d").to_string())
        .collect()
}

/// OHLC candlestick of the price history
pub fn candlestick(ticker: &str, days: u32, bars: &[PriceBar]) -> Option<Figure> {
    if bars.is_empty() {
        return None;
    }

    let trace = Trace::Candlestick {
        x: dates(bars),
        open: bars.iter().map(|b| b.open).collect(),
        high: bars.iter().map(|b| b.high).collect(),
        low: bars.iter().map(|b| b.low).collect(),
        close: bars.iter().map(|b| b.close).collect(),
        name: ticker.to_string(),
    };

    Some(Figure {
        data: vec![trace],
        layout: Layout {
            title: Some(Title::new(format!("{} Stock Price ({} days)", ticker, days))),
            xaxis: Some(date_axis(Some(RangeSlider { visible: false }))),
            yaxis: Some(Axis {
                title: Title::new("Price ($)"),
                rangeslider: None,
            }),
            height: 400,
        },
    })
}

/// Daily trading volume bars
pub fn volume(ticker: &str, days: u32, bars: &[PriceBar]) -> Option<Figure> {
    if bars.is_empty() {
        return None;
    }

    let trace = Trace::Bar {
        x: dates(bars),
        y: bars.iter().map(|b| b.volume as f64).collect(),
        name: "Volume".to_string(),
        marker: Marker {
            color: "lightblue".to_string(),
        },
    };

    Some(Figure {
        data: vec![trace],
        layout: Layout {
            title: Some(Title::new(format!("{} Trading Volume ({} days)", ticker, days))),
            xaxis: Some(date_axis(None)),
            yaxis: Some(Axis {
                title: Title::new("Volume"),
                rangeslider: None,
            }),
            height: 300,
        },
    })
}

/// Gauge over `[0, 1]` with low, medium and high bands
pub fn gauge(title: &str, value: f64) -> Figure {
    let steps = [
        ([0.0, 0.33], "lightgreen"),
        ([0.33, 0.66], "yellow"),
        ([0.66, 1.0], "lightcoral"),
    ]
    .into_iter()
    .map(|(range, color)| GaugeStep {
        range,
        color: color.to_string(),
    })
    .collect();

    let trace = Trace::Indicator {
        mode: "gauge+number".to_string(),
        value: value.clamp(0.0, 1.0),
        title: Title::new(title),
        gauge: Gauge {
            axis: GaugeAxis { range: [0.0, 1.0] },
            bar: Marker {
                color: "darkblue".to_string(),
            },
            steps,
        },
    };

    Figure {
        data: vec![trace],
        layout: Layout {
            title: None,
            xaxis: None,
            yaxis: None,
            height: 300,
        },
    }
}

const PIE_COLORS: [&str; 4] = ["#ff9999", "#66b3ff", "#99ff99", "#ffcc99"];

/// Pie of labelled shares; slices with no weight are left out
pub fn pie(title: &str, slices: &[(&str, f64)]) -> Option<Figure> {
    let slices: Vec<_> = slices.iter().filter(|(_, v)| *v > 0.0).collect();
    if slices.is_empty() {
        return None;
    }

    let colors = PIE_COLORS
        .iter()
        .cycle()
        .take(slices.len())
        .map(|c| (*c).to_string())
        .collect();

    let trace = Trace::Pie {
        labels: slices.iter().map(|(label, _)| (*label).to_string()).collect(),
        values: slices.iter().map(|(_, value)| *value).collect(),
        marker: PieMarker { colors },
        textinfo: "label+percent".to_string(),
    };

    Some(Figure {
        data: vec![trace],
        layout: Layout {
            title: Some(Title::new(title)),
            xaxis: None,
            yaxis: None,
            height: 400,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn bars() -> Vec<PriceBar> {
        (14..=15)
            .map(|day| PriceBar {
                date: Utc.with_ymd_and_hms(2024, 11, day, 0, 0, 0).unwrap(),
                open: 100.0,
                high: 105.0,
                low: 99.0,
                close: 104.0,
                volume: 2_000_000,
            })
            .collect()
    }

    #[test]
    fn test_candlestick() {
        let figure = candlestick("NVDA", 30, &bars()).unwrap();
        let value = serde_json::to_value(&figure).unwrap();

        assert_eq!(value["layout"]["title"]["text"], "NVDA Stock Price (30 days)");
        assert_eq!(value["layout"]["xaxis"]["rangeslider"]["visible"], false);
        assert_eq!(value["data"][0]["type"], "candlestick");
        assert_eq!(value["data"][0]["x"], json!(["2024-11-14", "2024-11-15"]));
    }

    #[test]
    fn test_volume() {
        let figure = volume("NVDA", 7, &bars()).unwrap();
        let value = serde_json::to_value(&figure).unwrap();

        assert_eq!(value["layout"]["title"]["text"], "NVDA Trading Volume (7 days)");
        assert_eq!(value["data"][0]["type"], "bar");
        assert_eq!(value["data"][0]["marker"]["color"], "lightblue");
        assert!(value["layout"]["xaxis"].get("rangeslider").is_none());
    }

    #[test]
    fn test_no_bars_no_figure() {
        assert!(candlestick("NVDA", 30, &[]).is_none());
        assert!(volume("NVDA", 30, &[]).is_none());
    }

    #[test]
    fn test_gauge_bands() {
        let figure = gauge("Sell Share", 1.7);
        let Trace::Indicator { value, gauge, .. } = &figure.data[0] else {
            panic!("expected indicator trace");
        };

        assert_eq!(*value, 1.0);
        let ranges: Vec<_> = gauge.steps.iter().map(|s| s.range).collect();
        assert_eq!(ranges, [[0.0, 0.33], [0.33, 0.66], [0.66, 1.0]]);
    }

    #[test]
    fn test_pie() {
        let figure = pie("Decisions", &[("Buy", 2.0), ("Sell", 0.0), ("Hold", 1.0)]).unwrap();
        let value = serde_json::to_value(&figure).unwrap();

        assert_eq!(value["data"][0]["type"], "pie");
        assert_eq!(value["data"][0]["labels"], json!(["Buy", "Hold"]));
        assert_eq!(value["data"][0]["marker"]["colors"], json!(["#ff9999", "#66b3ff"]));

        assert!(pie("Decisions", &[("Buy", 0.0)]).is_none());
    }
}
