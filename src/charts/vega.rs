//! Vega-Lite Spec Module
//! Typed subset of the Vega-Lite v5 grammar used by the interactive chart.

use serde::Serialize;
use serde_json::Value;

pub const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineData {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Line,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculate {
    pub calculate: String,
    #[serde(rename = "as")]
    pub as_field: String,
}

impl Calculate {
    pub fn new(expr: &str, field: &str) -> Self {
        Self {
            calculate: expr.to_string(),
            as_field: field.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scale {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub scale_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    pub nice: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionChannel {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

impl PositionChannel {
    pub fn quantitative(field: &str, title: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: "quantitative",
            axis: Axis {
                title: title.to_string(),
            },
            scale: None,
        }
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorChannel {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

impl ColorChannel {
    pub fn nominal(field: &str) -> Self {
        Self {
            field: field.to_string(),
            field_type: "nominal",
            legend: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeCondition {
    pub param: String,
    pub empty: bool,
    pub value: u32,
}

/// Marker size that switches on selection membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalSize {
    pub condition: SizeCondition,
    pub value: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encoding {
    pub x: PositionChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<PositionChannel>,
    pub color: ColorChannel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<ConditionalSize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub data: InlineData,
    pub mark: MarkType,
    pub transform: Vec<Calculate>,
    pub encoding: Encoding,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub layer: Vec<UnitSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VConcatSpec {
    pub vconcat: Vec<LayerSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConcatItem {
    VConcat(VConcatSpec),
    Layer(LayerSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selection {
    Point {
        on: String,
        nearest: bool,
        fields: Vec<String>,
    },
    Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub select: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<&'static str>,
    pub views: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopLevelSpec {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub hconcat: Vec<ConcatItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
}
