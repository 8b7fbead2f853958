use pulse_types::api::Claims;
use pulse_types::models::Role;

use crate::error::ApiError;

/// Authorization policy consulted by every controller. Role checks and
/// owner-or-elevated checks live here so handlers never re-implement the
/// branching themselves.

pub fn require_role(claims: &Claims, min: Role) -> Result<(), ApiError> {
    if claims.role >= min {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Allow the owning actor, or anyone at or above the given role.
pub fn owner_or(claims: &Claims, owner_id: &str, min: Role) -> Result<(), ApiError> {
    if claims.sub.to_string() == owner_id {
        return Ok(());
    }
    require_role(claims, min)
}

/// Strict ownership: elevated roles get no bypass (personal health notes).
pub fn owner_only(claims: &Claims, owner_id: &str) -> Result<(), ApiError> {
    if claims.sub.to_string() == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            username: "tester".into(),
            role,
            exp: 0,
        }
    }

    #[test]
    fn test_role_gate_respects_ordering() {
        assert!(require_role(&claims(Role::Admin), Role::Doctor).is_ok());
        assert!(require_role(&claims(Role::Doctor), Role::Doctor).is_ok());
        assert!(require_role(&claims(Role::User), Role::Doctor).is_err());
        assert!(require_role(&claims(Role::Doctor), Role::Admin).is_err());
    }

    #[test]
    fn test_owner_or_elevated() {
        let c = claims(Role::User);
        let own = c.sub.to_string();
        assert!(owner_or(&c, &own, Role::Admin).is_ok());
        assert!(owner_or(&c, "someone-else", Role::Admin).is_err());
        assert!(owner_or(&claims(Role::Admin), "someone-else", Role::Admin).is_ok());
    }

    #[test]
    fn test_owner_only_has_no_admin_bypass() {
        let admin = claims(Role::Admin);
        assert!(owner_only(&admin, "someone-else").is_err());
        assert!(owner_only(&admin, &admin.sub.to_string()).is_ok());
    }
}
