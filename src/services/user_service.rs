//! User service - Profiles, addresses and admin account management.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    user::normalize_email, Address, AddressInput, NewUser, Password, UpdateProfile, User, UserRole,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Change name and/or email; a new email must not belong to another account
    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> AppResult<User>;

    async fn list_addresses(&self, user_id: Uuid) -> AppResult<Vec<Address>>;

    async fn add_address(&self, user_id: Uuid, input: AddressInput) -> AppResult<Address>;

    async fn update_address(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: AddressInput,
    ) -> AppResult<Address>;

    async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<()>;

    /// All accounts, newest first (admin)
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Change a role. Admins cannot demote themselves.
    async fn update_role(&self, actor_id: Uuid, id: Uuid, role: UserRole) -> AppResult<User>;

    /// Permanently delete an account. Admins cannot delete themselves.
    async fn delete_user(&self, actor_id: Uuid, id: Uuid) -> AppResult<()>;

    /// Create an admin account, or promote the account already using `email`.
    async fn bootstrap_admin(&self, name: String, email: String, password: String)
        -> AppResult<User>;
}

pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn update_profile(&self, id: Uuid, update: UpdateProfile) -> AppResult<User> {
        let current = self.get_user(id).await?;

        let email = match update.email {
            Some(email) => {
                let email = normalize_email(&email);
                if email != current.email {
                    if let Some(other) = self.uow.users().find_by_email(&email).await? {
                        if other.id != id {
                            return Err(AppError::conflict("Email"));
                        }
                    }
                }
                Some(email)
            }
            None => None,
        };
        let name = update.name.map(|name| name.trim().to_string());

        self.uow.users().update_profile(id, name, email).await
    }

    async fn list_addresses(&self, user_id: Uuid) -> AppResult<Vec<Address>> {
        self.uow.addresses().list_for_user(user_id).await
    }

    async fn add_address(&self, user_id: Uuid, input: AddressInput) -> AppResult<Address> {
        self.get_user(user_id).await?;
        self.uow.addresses().create(user_id, input).await
    }

    async fn update_address(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: AddressInput,
    ) -> AppResult<Address> {
        self.uow
            .addresses()
            .find(user_id, address_id)
            .await?
            .ok_or_not_found("Address")?;

        self.uow.addresses().update(user_id, address_id, input).await
    }

    async fn delete_address(&self, user_id: Uuid, address_id: Uuid) -> AppResult<()> {
        if !self.uow.addresses().delete(user_id, address_id).await? {
            return Err(AppError::not_found("Address"));
        }
        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn update_role(&self, actor_id: Uuid, id: Uuid, role: UserRole) -> AppResult<User> {
        if actor_id == id && role != UserRole::Admin {
            return Err(AppError::forbidden("You cannot remove your own admin role"));
        }

        self.get_user(id).await?;
        let user = self.uow.users().update_role(id, role).await?;
        tracing::info!(user_id = %id, role = %role, "User role changed");
        Ok(user)
    }

    async fn delete_user(&self, actor_id: Uuid, id: Uuid) -> AppResult<()> {
        if actor_id == id {
            return Err(AppError::forbidden("You cannot delete your own account"));
        }

        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn bootstrap_admin(
        &self,
        name: String,
        email: String,
        password: String,
    ) -> AppResult<User> {
        let email = normalize_email(&email);
        if let Some(existing) = self.uow.users().find_by_email(&email).await? {
            if existing.is_admin() {
                return Ok(existing);
            }
            let user = self.uow.users().update_role(existing.id, UserRole::Admin).await?;
            tracing::info!(user_id = %user.id, "Existing user promoted to admin");
            return Ok(user);
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(NewUser {
                name: name.trim().to_string(),
                email,
                password_hash,
                role: UserRole::Admin,
            })
            .await?;
        tracing::info!(user_id = %user.id, "Admin account created");
        Ok(user)
    }
}
