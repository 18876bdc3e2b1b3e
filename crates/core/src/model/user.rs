use chrono::{DateTime, Utc};

/// Access level granted by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Patient,
    Admin,
}

impl Role {
    /// Map the role claim issued by the identity service.
    ///
    /// Anything other than an explicit `"admin"` grants the patient role.
    #[must_use]
    pub fn from_claim(claim: Option<&str>) -> Self {
        match claim.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Patient,
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The signed-in user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl UserIdentity {
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
        }
    }
}

/// Row of the administrator's patient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub id: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}
