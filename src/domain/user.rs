use serde::{Deserialize, Serialize};

/// Roles the public web app can hand us. Only authors may hold a session
/// in the dashboard; any other role is rejected during transfer and init.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "AUTHOR")]
    Author,
    #[serde(rename = "USER")]
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_author(&self) -> bool {
        self.role == Role::Author
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_json() {
        let user = User {
            id: "u-1".to_owned(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            role: Role::Author,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains(r#""role":"AUTHOR""#));
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn unknown_role_fails_to_parse() {
        let raw = r#"{"id":"u-1","name":"Eve","email":"eve@example.com","role":"ADMIN"}"#;
        assert!(serde_json::from_str::<User>(raw).is_err());
    }
}
