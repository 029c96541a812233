//! Account domain models.
//!
//! The source system kept students, staff and admins in three separate
//! collections and resolved logins with a waterfall lookup. Here a single
//! `Account` carries a role tag plus an optional role-specific profile,
//! backed by one indexed lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role tag.
///
/// Serialized as `user` / `staff` / `admin`, the values embedded in session
/// tokens and expected by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    Student,
    #[serde(rename = "staff")]
    Staff,
    #[serde(rename = "admin")]
    Admin,
}

impl Role {
    /// The wire tag for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "user",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Parses a wire tag back into a role.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "user" => Some(Role::Student),
            "staff" => Some(Role::Staff),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Admins are excluded from self-service password reset.
    pub fn can_self_service_reset(&self) -> bool {
        !matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student-specific profile fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub register_number: String,
    pub semester: i16,
    pub section: Option<String>,
    /// Free-text reference to the responsible staff member by name.
    pub tutor_name: String,
}

/// Staff-specific profile fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub staff_id: String,
    pub department: String,
    pub designation: String,
}

/// A unified account: common identity plus at most one role profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff: Option<StaffProfile>,
}

impl Account {
    /// The student's register number, when this is a student account.
    pub fn register_number(&self) -> Option<&str> {
        self.student.as_ref().map(|s| s.register_number.as_str())
    }
}

/// Student entry returned by the classmate search.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub register_number: String,
    pub name: String,
    pub email: String,
    pub semester: i16,
    pub section: Option<String>,
}

/// Staff entry returned by the tutor-selection list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_tags() {
        assert_eq!(Role::Student.as_str(), "user");
        assert_eq!(Role::Staff.as_str(), "staff");
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Student, Role::Staff, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("tutor"), None);
    }

    #[test]
    fn test_role_serde_rename() {
        assert_eq!(serde_json::to_string(&Role::Student).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
    }

    #[test]
    fn test_admin_excluded_from_reset() {
        assert!(Role::Student.can_self_service_reset());
        assert!(Role::Staff.can_self_service_reset());
        assert!(!Role::Admin.can_self_service_reset());
    }

    #[test]
    fn test_register_number_accessor() {
        let account = Account {
            id: Uuid::new_v4(),
            role: Role::Student,
            name: "Asha".into(),
            email: "asha@college.edu".into(),
            student: Some(StudentProfile {
                register_number: "21CSE042".into(),
                semester: 5,
                section: Some("A".into()),
                tutor_name: "Dr. Rao".into(),
            }),
            staff: None,
        };
        assert_eq!(account.register_number(), Some("21CSE042"));
    }
}
