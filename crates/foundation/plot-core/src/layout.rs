//! Layouts - subdivided parcels with a plot map

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::label::PlotKey;
use crate::slot::Slot;
use crate::{Error, Result};

/// A layout record as returned by `GET /layouts/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    #[serde(deserialize_with = "crate::slot::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Externally hosted plot-map SVG
    #[serde(default)]
    pub layout_image_url: Option<String>,
    /// Raster hero image, also the fallback when the SVG is unusable
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub slots: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots_by_section: Option<BTreeMap<String, Vec<Slot>>>,
}

impl Layout {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Layout")
    }

    /// Slots grouped by section title, in sorted section order.
    ///
    /// The API's own grouping wins when it sent one.
    pub fn slots_by_section(&self) -> BTreeMap<String, Vec<Slot>> {
        if let Some(grouped) = self.slots_by_section.as_ref().filter(|g| !g.is_empty()) {
            return grouped.clone();
        }
        let mut grouped: BTreeMap<String, Vec<Slot>> = BTreeMap::new();
        for slot in &self.slots {
            grouped
                .entry(slot.section_title.trim().to_string())
                .or_default()
                .push(slot.clone());
        }
        grouped
    }

    /// First slot whose section title normalizes to `key`
    pub fn slot_for_key(&self, key: &PlotKey) -> Option<&Slot> {
        self.slots.iter().find(|s| key.matches(&s.section_title))
    }

    pub fn slot(&self, id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn require_slot(&self, id: &str) -> Result<&Slot> {
        self.slot(id).ok_or_else(|| Error::UnknownSlot(id.to_string()))
    }

    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_available()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlotStatus;

    fn layout() -> Layout {
        Layout::from_json(
            r#"{
                "id": "L1",
                "title": "Green Acres",
                "layoutImageUrl": "https://cdn.example.com/l1.svg",
                "slots": [
                    {"id": "s1", "sectionTitle": "Plot 1", "status": "available"},
                    {"id": "s2", "sectionTitle": "Plot 2", "status": "sold"},
                    {"id": "s3", "sectionTitle": " Plot 1 ", "status": "available"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_slot_for_key_takes_first_match() {
        let l = layout();
        let hit = l.slot_for_key(&PlotKey::new("plot 1")).unwrap();
        assert_eq!(hit.id, "s1");
        assert!(l.slot_for_key(&PlotKey::new("plot 3")).is_none());
    }

    #[test]
    fn test_slots_by_section_groups_trimmed_titles() {
        let grouped = layout().slots_by_section();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["Plot 1"].len(), 2);
        assert_eq!(grouped["Plot 2"][0].status, SlotStatus::Sold);
    }

    #[test]
    fn test_require_slot() {
        let l = layout();
        assert!(l.require_slot("s2").is_ok());
        assert!(matches!(l.require_slot("nope"), Err(Error::UnknownSlot(_))));
        assert_eq!(l.available_count(), 2);
    }
}
