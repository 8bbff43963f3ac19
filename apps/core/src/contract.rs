use serde::{Deserialize, Serialize};

use crate::presenter::ResultRow;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultDto {
    pub title: String,
    pub subtitle: String,
    pub icon_ref: String,
    pub action_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<ResultDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivateRequest {
    pub action_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivateResponse {
    pub activated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshResponse {
    pub entries: usize,
    pub coalesced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    Search(SearchRequest),
    Activate(ActivateRequest),
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    Search(SearchResponse),
    Activate(ActivateResponse),
    Refresh(RefreshResponse),
}

impl From<ResultRow> for ResultDto {
    fn from(value: ResultRow) -> Self {
        Self {
            title: value.title,
            subtitle: value.subtitle,
            icon_ref: value.icon_ref,
            action_id: value.action_id,
        }
    }
}
