use crate::types::enums::Role;
use crate::types::ids::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The authenticated caller. Identity is established upstream (gateway JWT);
/// every command takes the actor explicitly rather than reading ambient
/// request state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and operators share the staff-only surface.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Operator)
    }
}

/// Owner-or-admin check applied before update/delete on owned resources.
pub fn can_mutate(actor: &Actor, owner: &UserId) -> bool {
    actor.is_admin() || actor.user_id == *owner
}

/// Comment deletion additionally allows the comment's own author and any
/// staff member, regardless of who owns the request.
pub fn can_delete_comment(actor: &Actor, comment_author: &UserId) -> bool {
    actor.is_staff() || actor.user_id == *comment_author
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_and_admin_may_mutate() {
        let owner = UserId::generate();
        let citizen = Actor::new(owner.clone(), Role::Citizen);
        let admin = Actor::new(UserId::generate(), Role::Admin);
        let stranger = Actor::new(UserId::generate(), Role::Citizen);

        assert!(can_mutate(&citizen, &owner));
        assert!(can_mutate(&admin, &owner));
        assert!(!can_mutate(&stranger, &owner));
    }

    #[test]
    fn operator_may_not_mutate_owned_resources() {
        let owner = UserId::generate();
        let operator = Actor::new(UserId::generate(), Role::Operator);
        assert!(!can_mutate(&operator, &owner));
    }

    #[test]
    fn comment_author_and_staff_may_delete() {
        let author = UserId::generate();
        let operator = Actor::new(UserId::generate(), Role::Operator);
        let stranger = Actor::new(UserId::generate(), Role::Citizen);

        assert!(can_delete_comment(
            &Actor::new(author.clone(), Role::Citizen),
            &author
        ));
        assert!(can_delete_comment(&operator, &author));
        assert!(!can_delete_comment(&stranger, &author));
    }
}
