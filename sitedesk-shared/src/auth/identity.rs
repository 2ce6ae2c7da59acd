/// Resolved caller identity
///
/// After token validation the API layer builds an [`Identity`] and threads
/// it explicitly through every handler call; there is no ambient "current
/// user" state anywhere in the system.
///
/// # Example
///
/// ```
/// use sitedesk_shared::auth::identity::Identity;
/// use sitedesk_shared::auth::jwt::Claims;
/// use sitedesk_shared::models::user::GlobalRole;
/// use uuid::Uuid;
///
/// let claims = Claims::new(Uuid::new_v4(), GlobalRole::Member, None);
/// let identity = Identity::from_claims(&claims);
/// assert_eq!(identity.global_role, GlobalRole::Member);
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::GlobalRole;

/// The `{user_id, global_role, company_id}` triple every request resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Company-wide role
    pub global_role: GlobalRole,

    /// Company affiliation; None for guests
    pub company_id: Option<Uuid>,
}

impl Identity {
    /// Builds an identity from validated token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            global_role: claims.role,
            company_id: claims.company_id,
        }
    }

    /// Whether this identity is an administrator of the given company
    pub fn is_admin_of(&self, company_id: Uuid) -> bool {
        self.global_role.is_admin() && self.company_id == Some(company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims() {
        let claims = Claims::new(Uuid::new_v4(), GlobalRole::Consultant, None);
        let identity = Identity::from_claims(&claims);
        assert_eq!(identity.user_id, claims.sub);
        assert_eq!(identity.global_role, GlobalRole::Consultant);
        assert_eq!(identity.company_id, None);
    }

    #[test]
    fn test_is_admin_of_requires_matching_company() {
        let company = Uuid::new_v4();
        let admin = Identity {
            user_id: Uuid::new_v4(),
            global_role: GlobalRole::Admin,
            company_id: Some(company),
        };
        assert!(admin.is_admin_of(company));
        assert!(!admin.is_admin_of(Uuid::new_v4()));

        // Companyless admins never match any company
        let stray = Identity { company_id: None, ..admin };
        assert!(!stray.is_admin_of(company));
    }
}
