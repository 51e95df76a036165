//! Slots - the individually sellable plots of a layout

use serde::{Deserialize, Deserializer, Serialize};

use crate::label::PlotKey;

/// Sale status of a slot as reported by the listing API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Sold,
    NotAvailable,
}

impl SlotStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SlotStatus::Available)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotStatus::Available => "Available",
            SlotStatus::Sold => "Sold",
            SlotStatus::NotAvailable => "Not available",
        }
    }

    /// CSS modifier used by the grid selector
    pub fn css_class(&self) -> &'static str {
        match self {
            SlotStatus::Available => "slot-available",
            SlotStatus::Sold => "slot-sold",
            SlotStatus::NotAvailable => "slot-na",
        }
    }
}

/// A plot record owned by the listing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Join key against the `inkscape:label` of the drawn plot group
    pub section_title: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub plot_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub area: Option<String>,
    #[serde(default)]
    pub facing: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_formatted: Option<String>,
    pub status: SlotStatus,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Slot {
    /// Normalized key of this slot's section title
    pub fn key(&self) -> PlotKey {
        PlotKey::new(&self.section_title)
    }

    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }

    /// Price as shown to visitors.
    ///
    /// Prefers the API's own formatting, falls back to Indian digit grouping.
    pub fn display_price(&self) -> String {
        if let Some(formatted) = self.price_formatted.as_deref().filter(|p| !p.trim().is_empty()) {
            return formatted.to_string();
        }
        match self.price {
            Some(price) if price > 0.0 => format!("₹{}", group_indian(price.round() as u64)),
            _ => "Price on request".to_string(),
        }
    }

    /// `width x height` when both dimensions are known
    pub fn dimensions(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{} x {}", trim_float(w), trim_float(h))),
            _ => None,
        }
    }
}

/// 1250000 -> "12,50,000"
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(v: StringOrNumber) -> Self {
        match v {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrNumber::deserialize(d).map(String::from)
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrNumber>::deserialize(d).map(|v| v.map(String::from))
}
