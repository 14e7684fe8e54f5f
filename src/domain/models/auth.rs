use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        return match &self.full_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self.email.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthIdentity {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Guest,
    Authenticated,
}
