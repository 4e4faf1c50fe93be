use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(rename = "Destination", default)]
    pub destination: String,
}

#[derive(Debug, Serialize)]
pub struct CreateLinkResponse {
    #[serde(rename = "Source")]
    pub source: String,
}
