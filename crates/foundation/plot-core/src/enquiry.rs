//! Enquiry payloads for `POST /enquiries`

use serde::{Deserialize, Serialize};

/// What the enquiry is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnquiryKind {
    Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryRequest {
    #[serde(rename = "type")]
    pub kind: EnquiryKind,
    pub layout_id: String,
    pub slot_id: String,
    pub message: String,
}

impl EnquiryRequest {
    pub fn for_slot(layout_id: &str, slot_id: &str, message: &str) -> Self {
        Self {
            kind: EnquiryKind::Layout,
            layout_id: layout_id.to_string(),
            slot_id: slot_id.to_string(),
            message: message.trim().to_string(),
        }
    }
}
