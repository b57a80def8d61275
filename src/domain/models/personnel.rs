use serde::{Deserialize, Serialize};

/// One entry of the allow-list of personnel eligible to register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedAgent {
    #[serde(rename = "code_personnel")]
    pub staff_code: String,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}
