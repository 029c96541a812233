//! Account entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Account, Role, StaffProfile, StudentProfile};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for the account role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
pub enum RoleDb {
    Student,
    Staff,
    Admin,
}

impl From<RoleDb> for Role {
    fn from(db_role: RoleDb) -> Self {
        match db_role {
            RoleDb::Student => Role::Student,
            RoleDb::Staff => Role::Staff,
            RoleDb::Admin => Role::Admin,
        }
    }
}

impl From<Role> for RoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => RoleDb::Student,
            Role::Staff => RoleDb::Staff,
            Role::Admin => RoleDb::Admin,
        }
    }
}

/// Database row mapping for the accounts table.
///
/// One table carries all three roles; role-specific columns are nullable and
/// populated only for the matching role.
#[derive(Debug, Clone, FromRow)]
pub struct AccountEntity {
    pub id: Uuid,
    pub role: RoleDb,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    // Student columns
    pub register_number: Option<String>,
    pub semester: Option<i16>,
    pub section: Option<String>,
    pub tutor_name: Option<String>,
    // Staff columns
    pub staff_id: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountEntity> for Account {
    fn from(entity: AccountEntity) -> Self {
        let role: Role = entity.role.into();

        let student = match (role, &entity.register_number) {
            (Role::Student, Some(register_number)) => Some(StudentProfile {
                register_number: register_number.clone(),
                semester: entity.semester.unwrap_or(1),
                section: entity.section.clone(),
                tutor_name: entity.tutor_name.clone().unwrap_or_default(),
            }),
            _ => None,
        };

        let staff = match (role, &entity.staff_id) {
            (Role::Staff, Some(staff_id)) => Some(StaffProfile {
                staff_id: staff_id.clone(),
                department: entity.department.clone().unwrap_or_default(),
                designation: entity.designation.clone().unwrap_or_default(),
            }),
            _ => None,
        };

        Account {
            id: entity.id,
            role,
            name: entity.name,
            email: entity.email,
            student,
            staff,
        }
    }
}

/// Row shape for the classmate search.
#[derive(Debug, Clone, FromRow)]
pub struct StudentSummaryEntity {
    pub register_number: String,
    pub name: String,
    pub email: String,
    pub semester: i16,
    pub section: Option<String>,
}

/// Row shape for the tutor-selection staff list.
#[derive(Debug, Clone, FromRow)]
pub struct StaffSummaryEntity {
    pub staff_id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub designation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(role: RoleDb) -> AccountEntity {
        let now = Utc::now();
        AccountEntity {
            id: Uuid::new_v4(),
            role,
            name: "Asha".into(),
            email: "asha@college.edu".into(),
            password_hash: "$argon2id$...".into(),
            register_number: Some("21CSE042".into()),
            semester: Some(5),
            section: Some("A".into()),
            tutor_name: Some("Dr. Rao".into()),
            staff_id: None,
            department: None,
            designation: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_student_entity_to_domain() {
        let account: Account = entity(RoleDb::Student).into();
        assert_eq!(account.role, Role::Student);
        let student = account.student.expect("student profile");
        assert_eq!(student.register_number, "21CSE042");
        assert_eq!(student.tutor_name, "Dr. Rao");
        assert!(account.staff.is_none());
    }

    #[test]
    fn test_admin_entity_has_no_profiles() {
        let mut e = entity(RoleDb::Admin);
        e.register_number = None;
        let account: Account = e.into();
        assert_eq!(account.role, Role::Admin);
        assert!(account.student.is_none());
        assert!(account.staff.is_none());
    }

    #[test]
    fn test_role_db_round_trip() {
        for role in [Role::Student, Role::Staff, Role::Admin] {
            let db: RoleDb = role.into();
            let back: Role = db.into();
            assert_eq!(back, role);
        }
    }
}
