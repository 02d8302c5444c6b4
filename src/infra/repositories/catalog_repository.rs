//! Catalog repositories: categories, subcategories and products.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::category::{self, Entity as CategoryEntity};
use super::entities::product::{self, Entity as ProductEntity};
use super::entities::subcategory::{self, Entity as SubCategoryEntity};
use crate::domain::{
    Category, CategoryInput, Product, ProductFilter, ProductInput, ProductSort, ProductUpdate,
    SubCategory, SubCategoryInput,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

// =============================================================================
// Categories
// =============================================================================

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories ordered by name
    async fn list(&self) -> AppResult<Vec<Category>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    async fn create(&self, input: CategoryInput) -> AppResult<Category>;

    async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<Category>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<u64>;
}

pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn list(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(Category::from))
    }

    async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(Category::from(model))
    }

    async fn update(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        let existing = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Category")?;

        let mut active: category::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Category::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CategoryEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Category"));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        CategoryEntity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// Subcategories
// =============================================================================

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SubCategoryRepository: Send + Sync {
    /// Subcategories ordered by name, optionally limited to one category
    async fn list(&self, category_id: Option<Uuid>) -> AppResult<Vec<SubCategory>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubCategory>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<SubCategory>>;

    async fn create(&self, input: SubCategoryInput) -> AppResult<SubCategory>;

    async fn update(&self, id: Uuid, input: SubCategoryInput) -> AppResult<SubCategory>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count_for_category(&self, category_id: Uuid) -> AppResult<u64>;
}

pub struct SubCategoryStore {
    db: DatabaseConnection,
}

impl SubCategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubCategoryRepository for SubCategoryStore {
    async fn list(&self, category_id: Option<Uuid>) -> AppResult<Vec<SubCategory>> {
        let mut query = SubCategoryEntity::find().order_by_asc(subcategory::Column::Name);
        if let Some(category_id) = category_id {
            query = query.filter(subcategory::Column::CategoryId.eq(category_id));
        }
        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(SubCategory::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<SubCategory>> {
        let result = SubCategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(SubCategory::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<SubCategory>> {
        let result = SubCategoryEntity::find()
            .filter(subcategory::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(SubCategory::from))
    }

    async fn create(&self, input: SubCategoryInput) -> AppResult<SubCategory> {
        let now = Utc::now();
        let model = subcategory::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            category_id: Set(input.category_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(SubCategory::from(model))
    }

    async fn update(&self, id: Uuid, input: SubCategoryInput) -> AppResult<SubCategory> {
        let existing = SubCategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Subcategory")?;

        let mut active: subcategory::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.category_id = Set(input.category_id);
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(SubCategory::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = SubCategoryEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Subcategory"));
        }
        Ok(())
    }

    async fn count_for_category(&self, category_id: Uuid) -> AppResult<u64> {
        SubCategoryEntity::find()
            .filter(subcategory::Column::CategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// Products
// =============================================================================

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Filtered, sorted page of products plus the total match count
    async fn list(
        &self,
        filter: ProductFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// Products for the given ids; unknown ids are skipped
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Product>>;

    async fn create(&self, input: ProductInput) -> AppResult<Product>;

    async fn update(&self, id: Uuid, update: ProductUpdate) -> AppResult<Product>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn count(&self) -> AppResult<u64>;

    async fn count_for_category(&self, category_id: Uuid) -> AppResult<u64>;

    async fn count_for_subcategory(&self, subcategory_id: Uuid) -> AppResult<u64>;

    /// Lowest-stock products strictly below `threshold`
    async fn low_stock(&self, threshold: i32, limit: u64) -> AppResult<Vec<Product>>;
}

pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_product<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<Product>> {
    let result = ProductEntity::find_by_id(id).one(db).await?;
    Ok(result.map(Product::from))
}

pub(crate) async fn find_products<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> AppResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let models = ProductEntity::find()
        .filter(product::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(models.into_iter().map(Product::from).collect())
}

/// Take `quantity` units only if that many are on hand.
///
/// Returns `false` when the guard failed; the row is left untouched.
pub(crate) async fn try_decrement_stock<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    quantity: i32,
) -> AppResult<bool> {
    let result = ProductEntity::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Put units back. Products deleted since the order was placed are skipped.
pub(crate) async fn restock<C: ConnectionTrait>(db: &C, id: Uuid, quantity: i32) -> AppResult<()> {
    ProductEntity::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).add(quantity),
        )
        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(product::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

pub(crate) async fn set_avg_rating<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    avg_rating: i32,
) -> AppResult<()> {
    ProductEntity::update_many()
        .col_expr(product::Column::AvgRating, Expr::value(avg_rating))
        .filter(product::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

fn filter_condition(filter: &ProductFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(product::Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(product::Column::Description))).like(pattern)),
        );
    }
    if filter.bestsellers_only {
        condition = condition.add(product::Column::IsBestseller.eq(true));
    }
    if let Some(after) = filter.created_after {
        condition = condition.add(product::Column::CreatedAt.gte(after));
    }
    if !filter.category_ids.is_empty() {
        condition = condition.add(product::Column::MajorCategoryId.is_in(filter.category_ids.clone()));
    }
    if !filter.subcategory_ids.is_empty() {
        condition = condition.add(product::Column::SubCategoryId.is_in(filter.subcategory_ids.clone()));
    }

    condition
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn list(
        &self,
        filter: ProductFilter,
        page: PaginationParams,
    ) -> AppResult<(Vec<Product>, u64)> {
        let query = ProductEntity::find().filter(filter_condition(&filter));
        let query = match filter.sort {
            Some(ProductSort::Asc) => query.order_by_asc(product::Column::Price),
            Some(ProductSort::Desc) => query.order_by_desc(product::Column::Price),
            Some(ProductSort::Rating) => query
                .order_by_desc(product::Column::AvgRating)
                .order_by_desc(product::Column::CreatedAt),
            Some(ProductSort::Newest) | None => query.order_by_desc(product::Column::CreatedAt),
        };

        let paginator = query.paginate(&self.db, page.limit());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page_index()).await?;

        Ok((models.into_iter().map(Product::from).collect(), total))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        find_product(&self.db, id).await
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Product>> {
        find_products(&self.db, ids).await
    }

    async fn create(&self, input: ProductInput) -> AppResult<Product> {
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            stock: Set(input.stock),
            is_bestseller: Set(input.is_bestseller),
            avg_rating: Set(0),
            image_url: Set(input.image_url),
            major_category_id: Set(input.major_category_id),
            sub_category_id: Set(input.sub_category_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;
        Ok(Product::from(model))
    }

    async fn update(&self, id: Uuid, update: ProductUpdate) -> AppResult<Product> {
        let existing = ProductEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Product")?;

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(price) = update.price {
            active.price = Set(price);
        }
        if let Some(stock) = update.stock {
            active.stock = Set(stock);
        }
        if let Some(is_bestseller) = update.is_bestseller {
            active.is_bestseller = Set(is_bestseller);
        }
        if let Some(image_url) = update.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = update.major_category_id {
            active.major_category_id = Set(category_id);
        }
        if let Some(subcategory_id) = update.sub_category_id {
            active.sub_category_id = Set(Some(subcategory_id));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Product::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Product"));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        ProductEntity::find()
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn count_for_category(&self, category_id: Uuid) -> AppResult<u64> {
        ProductEntity::find()
            .filter(product::Column::MajorCategoryId.eq(category_id))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn count_for_subcategory(&self, subcategory_id: Uuid) -> AppResult<u64> {
        ProductEntity::find()
            .filter(product::Column::SubCategoryId.eq(subcategory_id))
            .count(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn low_stock(&self, threshold: i32, limit: u64) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::Stock.lt(threshold))
            .order_by_asc(product::Column::Stock)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }
}
