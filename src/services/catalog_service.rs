//! Catalog service - Categories, subcategories and products.
//!
//! Names of categories and subcategories are unique. A category or
//! subcategory cannot be deleted while anything still references it, and a
//! product's subcategory must belong to its major category.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryInput, Product, ProductInput, ProductListQuery, ProductUpdate, SubCategory,
    SubCategoryInput,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn get_category(&self, id: Uuid) -> AppResult<Category>;

    async fn create_category(&self, input: CategoryInput) -> AppResult<Category>;

    async fn update_category(&self, id: Uuid, input: CategoryInput) -> AppResult<Category>;

    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    async fn list_subcategories(&self, category_id: Option<Uuid>) -> AppResult<Vec<SubCategory>>;

    async fn get_subcategory(&self, id: Uuid) -> AppResult<SubCategory>;

    async fn create_subcategory(&self, input: SubCategoryInput) -> AppResult<SubCategory>;

    async fn update_subcategory(&self, id: Uuid, input: SubCategoryInput)
        -> AppResult<SubCategory>;

    async fn delete_subcategory(&self, id: Uuid) -> AppResult<()>;

    async fn list_products(&self, query: ProductListQuery) -> AppResult<Paginated<Product>>;

    async fn get_product(&self, id: Uuid) -> AppResult<Product>;

    async fn create_product(&self, input: ProductInput) -> AppResult<Product>;

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> AppResult<Product>;

    async fn delete_product(&self, id: Uuid) -> AppResult<()>;
}

pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// The category must exist and, when given, the subcategory must exist
    /// and hang under it.
    async fn check_placement(&self, category_id: Uuid, subcategory_id: Option<Uuid>) -> AppResult<()> {
        self.uow
            .categories()
            .find_by_id(category_id)
            .await?
            .ok_or_not_found("Category")?;

        if let Some(subcategory_id) = subcategory_id {
            let subcategory = self
                .uow
                .subcategories()
                .find_by_id(subcategory_id)
                .await?
                .ok_or_not_found("Subcategory")?;
            if subcategory.category_id != category_id {
                return Err(AppError::validation(
                    "Subcategory does not belong to the selected category",
                ));
            }
        }
        Ok(())
    }

    async fn ensure_category_name_free(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.uow.categories().find_by_name(name.trim()).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::conflict("Category")),
            _ => Ok(()),
        }
    }

    async fn ensure_subcategory_name_free(&self, name: &str, except: Option<Uuid>) -> AppResult<()> {
        match self.uow.subcategories().find_by_name(name.trim()).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(AppError::conflict("Subcategory"))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.uow.categories().list().await
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.uow
            .categories()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Category")
    }

    async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        self.ensure_category_name_free(&input.name, None).await?;
        self.uow.categories().create(input).await
    }

    async fn update_category(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        self.ensure_category_name_free(&input.name, Some(id)).await?;
        self.uow.categories().update(id, input).await
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        if self.uow.products().count_for_category(id).await? > 0 {
            return Err(AppError::validation(
                "Category still has products and cannot be deleted",
            ));
        }
        if self.uow.subcategories().count_for_category(id).await? > 0 {
            return Err(AppError::validation(
                "Category still has subcategories and cannot be deleted",
            ));
        }
        self.uow.categories().delete(id).await
    }

    async fn list_subcategories(&self, category_id: Option<Uuid>) -> AppResult<Vec<SubCategory>> {
        self.uow.subcategories().list(category_id).await
    }

    async fn get_subcategory(&self, id: Uuid) -> AppResult<SubCategory> {
        self.uow
            .subcategories()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Subcategory")
    }

    async fn create_subcategory(&self, input: SubCategoryInput) -> AppResult<SubCategory> {
        self.get_category(input.category_id).await?;
        self.ensure_subcategory_name_free(&input.name, None).await?;
        self.uow.subcategories().create(input).await
    }

    async fn update_subcategory(
        &self,
        id: Uuid,
        input: SubCategoryInput,
    ) -> AppResult<SubCategory> {
        self.get_category(input.category_id).await?;
        self.ensure_subcategory_name_free(&input.name, Some(id)).await?;
        self.uow.subcategories().update(id, input).await
    }

    async fn delete_subcategory(&self, id: Uuid) -> AppResult<()> {
        if self.uow.products().count_for_subcategory(id).await? > 0 {
            return Err(AppError::validation(
                "Subcategory still has products and cannot be deleted",
            ));
        }
        self.uow.subcategories().delete(id).await
    }

    async fn list_products(&self, query: ProductListQuery) -> AppResult<Paginated<Product>> {
        let (filter, page) = query.into_filter(Utc::now())?;
        let (products, total) = self.uow.products().list(filter, page).await?;
        Ok(Paginated::new(products, page, total))
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        self.uow
            .products()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Product")
    }

    async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        self.check_placement(input.major_category_id, input.sub_category_id)
            .await?;
        let product = self.uow.products().create(input).await?;
        tracing::info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, update: ProductUpdate) -> AppResult<Product> {
        let current = self.get_product(id).await?;

        if update.major_category_id.is_some() || update.sub_category_id.is_some() {
            let category_id = update.major_category_id.unwrap_or(current.major_category_id);
            let subcategory_id = update.sub_category_id.or(current.sub_category_id);
            self.check_placement(category_id, subcategory_id).await?;
        }

        self.uow.products().update(id, update).await
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        self.uow.products().delete(id).await?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
