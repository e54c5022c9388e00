//! Plotly-compatible figure JSON.
//!
//! Only the attributes the charts here use are modelled; `None` fields are
//! omitted so Plotly applies its own defaults.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// The figure as a JSON string, the shape the front-end `JSON.parse`s.
    pub fn to_graph_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovertemplate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legendgroup: Option<String>,
}

impl Trace {
    pub fn scatter(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            kind: "scatter",
            x,
            y,
            mode: "lines",
            name: name.into(),
            line: None,
            xaxis: None,
            yaxis: None,
            hovertemplate: None,
            showlegend: None,
            legendgroup: None,
        }
    }

    pub fn mode(mut self, mode: &'static str) -> Self {
        self.mode = mode;
        self
    }

    pub fn colour(mut self, colour: &str, width: f64) -> Self {
        self.line = Some(Line {
            color: Some(colour.to_string()),
            width: Some(width),
        });
        self
    }

    /// Places the trace on subplot axes `x{n}`/`y{n}` (`n == 1` is the default pair).
    pub fn on_axes(mut self, n: usize) -> Self {
        if n > 1 {
            self.xaxis = Some(format!("x{n}"));
            self.yaxis = Some(format!("y{n}"));
        }
        self
    }

    pub fn hover(mut self, template: impl Into<String>) -> Self {
        self.hovertemplate = Some(template.into());
        self
    }

    pub fn legend(mut self, group: impl Into<String>, show: bool) -> Self {
        self.legendgroup = Some(group.into());
        self.showlegend = Some(show);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Title {
    pub text: String,
}

impl From<&str> for Title {
    fn from(text: &str) -> Self {
        Self { text: text.into() }
    }
}

impl From<String> for Title {
    fn from(text: String) -> Self {
        Self { text }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaleanchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl Axis {
    pub fn titled(text: impl Into<Title>) -> Self {
        Self {
            title: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// `xaxis`, `yaxis`, `yaxis2`, ...
    #[serde(flatten)]
    pub axes: BTreeMap<String, Axis>,
}

impl Layout {
    pub fn new(title: impl Into<Title>) -> Self {
        Self {
            title: title.into(),
            template: Some("plotly_dark".to_string()),
            ..Default::default()
        }
    }

    pub fn axis(mut self, key: &str, axis: Axis) -> Self {
        self.axes.insert(key.to_string(), axis);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_json_shape() {
        let fig = Figure {
            data: vec![Trace::scatter("VER", vec![1.0, 2.0], vec![90.1, 89.7]).on_axes(2)],
            layout: Layout::new("Lap Times").axis("xaxis", Axis::titled("Lap Number")),
        };

        let value: serde_json::Value = serde_json::from_str(&fig.to_graph_json().unwrap()).unwrap();

        assert_eq!(value["data"][0]["type"], "scatter");
        assert_eq!(value["data"][0]["yaxis"], "y2");
        assert_eq!(value["layout"]["title"]["text"], "Lap Times");
        assert_eq!(value["layout"]["xaxis"]["title"]["text"], "Lap Number");
        assert_eq!(value["layout"]["template"], "plotly_dark");
        assert!(value["data"][0].get("line").is_none());
    }
}
