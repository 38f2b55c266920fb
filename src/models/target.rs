use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub base_url: String,
    pub endpoint_path: String,
    pub auth_token: Option<String>,
}

impl Target {
    pub fn new(base_url: &str, endpoint_path: &str, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint_path: endpoint_path.to_string(),
            auth_token,
        }
    }

    pub fn full_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoint_path)
    }
}
