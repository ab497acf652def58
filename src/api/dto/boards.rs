use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBoardRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub updated_title: String,
}
