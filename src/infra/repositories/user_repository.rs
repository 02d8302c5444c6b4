//! User and address repositories.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::address::{self, Entity as AddressEntity};
use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{Address, AddressInput, NewUser, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (already normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Update name and/or email
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User>;

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Permanently delete a user; addresses, cart and wishlist cascade
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// All users, newest first
    async fn list(&self) -> AppResult<Vec<User>>;

    async fn count(&self) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<User>> {
    let result = UserEntity::find_by_id(id).one(db).await?;
    Ok(result.map(User::from))
}

async fn load_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<user::Model> {
    UserEntity::find_by_id(id).one(db).await?.ok_or_not_found("User")
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_user(&self.db, id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut active: ActiveModel = load_user(&self.db, id).await?.into();

        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(email) = email {
            active.email = Set(email);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut active: ActiveModel = load_user(&self.db, id).await?.into();
        active.role = Set(role.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut active: ActiveModel = load_user(&self.db, id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("User"));
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn count(&self) -> AppResult<u64> {
        UserEntity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}

/// Addresses are always addressed through their owning user.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Address>>;

    async fn find(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Option<Address>>;

    async fn create(&self, user_id: Uuid, input: AddressInput) -> AppResult<Address>;

    async fn update(&self, user_id: Uuid, address_id: Uuid, input: AddressInput)
        -> AppResult<Address>;

    /// Returns whether a row was removed
    async fn delete(&self, user_id: Uuid, address_id: Uuid) -> AppResult<bool>;
}

pub struct AddressStore {
    db: DatabaseConnection,
}

impl AddressStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_address<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    address_id: Uuid,
) -> AppResult<Option<Address>> {
    let result = AddressEntity::find_by_id(address_id)
        .filter(address::Column::UserId.eq(user_id))
        .one(db)
        .await?;
    Ok(result.map(Address::from))
}

#[async_trait]
impl AddressRepository for AddressStore {
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Address>> {
        let models = AddressEntity::find()
            .filter(address::Column::UserId.eq(user_id))
            .order_by_asc(address::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Address::from).collect())
    }

    async fn find(&self, user_id: Uuid, address_id: Uuid) -> AppResult<Option<Address>> {
        find_address(&self.db, user_id, address_id).await
    }

    async fn create(&self, user_id: Uuid, input: AddressInput) -> AppResult<Address> {
        let model = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            street: Set(input.street),
            city: Set(input.city),
            state: Set(input.state),
            country: Set(input.country),
            zip: Set(input.zip),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        Ok(Address::from(model))
    }

    async fn update(
        &self,
        user_id: Uuid,
        address_id: Uuid,
        input: AddressInput,
    ) -> AppResult<Address> {
        let existing = AddressEntity::find_by_id(address_id)
            .filter(address::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or_not_found("Address")?;

        let mut active: address::ActiveModel = existing.into();
        active.street = Set(input.street);
        active.city = Set(input.city);
        active.state = Set(input.state);
        active.country = Set(input.country);
        active.zip = Set(input.zip);

        let model = active.update(&self.db).await?;
        Ok(Address::from(model))
    }

    async fn delete(&self, user_id: Uuid, address_id: Uuid) -> AppResult<bool> {
        let result = AddressEntity::delete_many()
            .filter(address::Column::Id.eq(address_id))
            .filter(address::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }
}
