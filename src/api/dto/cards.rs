use serde::Deserialize;

use crate::domain::Column;

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub new_order: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeColumnRequest {
    pub new_column: Column,
}
