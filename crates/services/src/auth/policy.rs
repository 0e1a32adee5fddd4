//! Role policy: which roles may perform which write on which entity.

use dwellhub_db::models::Role;

use super::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Property,
    Booking,
    Lease,
    Maintenance,
    Notification,
    Review,
    Transaction,
    Conversation,
    User,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Property => "property",
            Entity::Booking => "booking",
            Entity::Lease => "lease",
            Entity::Maintenance => "maintenance request",
            Entity::Notification => "notification",
            Entity::Review => "review",
            Entity::Transaction => "transaction",
            Entity::Conversation => "conversation",
            Entity::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

const ANY: &[Role] = &[Role::Client, Role::Owner, Role::Admin];
const OWNERS: &[Role] = &[Role::Owner, Role::Admin];
const CLIENTS: &[Role] = &[Role::Client, Role::Admin];
const NONE: &[Role] = &[];

pub fn allowed_roles(entity: Entity, operation: Operation) -> &'static [Role] {
    use Entity as E;
    use Operation as O;

    match (entity, operation) {
        (E::Property, _) => OWNERS,
        (E::Booking, _) => ANY,
        (E::Lease, O::Update) => OWNERS,
        (E::Lease, _) => ANY,
        (E::Maintenance, O::Update) => OWNERS,
        (E::Maintenance, _) => ANY,
        (E::Notification, _) => ANY,
        (E::Review, O::Create) => CLIENTS,
        (E::Review, _) => ANY,
        (E::Transaction, _) => ANY,
        (E::Conversation, O::Create) => ANY,
        (E::Conversation, _) => NONE,
        (E::User, O::Update) => ANY,
        (E::User, _) => NONE,
    }
}

pub fn authorize(role: Role, entity: Entity, operation: Operation) -> Result<(), AuthError> {
    if allowed_roles(entity, operation).contains(&role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            role: role.as_str(),
            operation: operation.as_str(),
            entity: entity.as_str(),
        })
    }
}
