//! JSON shapes handed to callers of the harvester.
//!
//! Resume bytes only become base64 here, at the output boundary.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{HarvestedItem, PositionAggregate};

pub fn encode_resume(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_resume(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub apply_id: String,
    pub resume_id: String,
    pub post_id: String,
    pub post_name: String,
    pub recruit_type: String,
    pub jd: Option<Value>,
    pub resume_pdf_b64: Option<String>,
}

impl From<&HarvestedItem> for ItemPayload {
    fn from(item: &HarvestedItem) -> Self {
        Self {
            name: item.display_name.clone(),
            apply_id: item.apply_id.clone(),
            resume_id: item.resume_id.clone(),
            post_id: item.job_id.clone(),
            post_name: item.job_title.clone(),
            recruit_type: item.recruit_type.clone(),
            jd: item.job_description.clone(),
            resume_pdf_b64: item.resume.as_deref().map(encode_resume),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsPayload {
    pub total: u64,
    pub items: Vec<ItemPayload>,
}

impl ItemsPayload {
    /// Payload for a full traversal; `total` is the number of items.
    pub fn from_items(items: &[HarvestedItem]) -> Self {
        Self {
            total: items.len() as u64,
            items: items.iter().map(ItemPayload::from).collect(),
        }
    }

    /// Payload for a single page; `total` is the server's row count when it
    /// reported one and the item count otherwise.
    pub fn for_page(reported_total: Option<u64>, items: &[HarvestedItem]) -> Self {
        let mut payload = Self::from_items(items);
        if let Some(total) = reported_total.filter(|n| *n > 0) {
            payload.total = total;
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPayload {
    pub post_id: String,
    pub post_name: String,
    pub recruit_type: String,
    pub service_condition: String,
    pub work_content: String,
}

impl From<PositionAggregate> for PositionPayload {
    fn from(position: PositionAggregate) -> Self {
        Self {
            post_id: position.job_id,
            post_name: position.job_title,
            recruit_type: position.recruit_type,
            service_condition: position.qualification,
            work_content: position.responsibility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionsPayload {
    pub total: u64,
    pub positions: Vec<PositionPayload>,
}

impl PositionsPayload {
    pub fn from_positions(positions: Vec<PositionAggregate>) -> Self {
        Self {
            total: positions.len() as u64,
            positions: positions.into_iter().map(PositionPayload::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUser {
    pub corp_code: String,
    pub username: String,
}

/// Result of a login-only verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoginReport {
    Success { user: LoginUser },
    Error { message: String },
}
