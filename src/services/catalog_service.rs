// src/services/catalog_service.rs

use sqlx::PgPool;

use crate::{
    common::{error::AppError, money::parse_cents, slug::slugify},
    db::{product_repo::ProductFields, CategoryRepository, ProductRepository},
    models::catalog::{
        Category, CategoryWithProducts, CreateCategoryPayload, CreateProductPayload, Product, ProductQuery,
        UpdateCategoryPayload, UpdateProductPayload,
    },
};

const PRODUCT_UPDATE_FAILED: &str = "Não foi possível atualizar o produto.";

#[derive(Clone)]
pub struct CatalogService {
    categories: CategoryRepository,
    products: ProductRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(categories: CategoryRepository, products: ProductRepository, pool: PgPool) -> Self {
        Self { categories, products, pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self, business_id: i64, include_archived: bool) -> Result<Vec<Category>, AppError> {
        self.categories.list(business_id, include_archived).await
    }

    pub async fn create_category(&self, business_id: i64, payload: CreateCategoryPayload) -> Result<Category, AppError> {
        let name = payload.name.trim();
        let slug = resolve_slug(payload.slug.as_deref(), name)?;

        if self.categories.slug_taken(business_id, &slug, None).await? {
            return Err(AppError::BadRequest("Já existe uma categoria com este slug.".into()));
        }

        self.categories
            .create(business_id, name, &slug, payload.order_index.unwrap_or(0))
            .await
    }

    pub async fn update_category(
        &self,
        business_id: i64,
        id: i64,
        payload: UpdateCategoryPayload,
    ) -> Result<Category, AppError> {
        let current = self
            .categories
            .find_in_business(&self.pool, business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Categoria"))?;

        let name = payload.name.as_deref().map(str::trim);

        // Slug só muda se vier explícito; renomear não re-gera o slug.
        let slug = match payload.slug.as_deref() {
            Some(raw) => Some(resolve_slug(Some(raw), name.unwrap_or(&current.name))?),
            None => None,
        };
        if let Some(slug) = slug.as_deref() {
            if slug != current.slug && self.categories.slug_taken(business_id, slug, Some(id)).await? {
                return Err(AppError::BadRequest("Já existe uma categoria com este slug.".into()));
            }
        }

        if payload.is_active == Some(false) && current.is_active {
            self.ensure_no_active_products(business_id, id).await?;
        }

        self.categories
            .update(business_id, id, name, slug.as_deref(), payload.order_index, payload.is_active)
            .await
    }

    pub async fn archive_category(&self, business_id: i64, id: i64) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;

        self.categories
            .find_in_business(&mut *tx, business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Categoria"))?;

        let active = self
            .products
            .count_active_in_category(&mut *tx, business_id, id)
            .await?;
        if active > 0 {
            return Err(has_active_products(active));
        }

        let category = self.categories.archive(&mut *tx, business_id, id).await?;
        tx.commit().await?;

        tracing::info!(business_id, category_id = id, "🗂️ Categoria arquivada");
        Ok(category)
    }

    async fn ensure_no_active_products(&self, business_id: i64, category_id: i64) -> Result<(), AppError> {
        let active = self
            .products
            .count_active_in_category(&self.pool, business_id, category_id)
            .await?;
        if active > 0 {
            return Err(has_active_products(active));
        }
        Ok(())
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn list_products(&self, business_id: i64, filter: &ProductQuery) -> Result<Vec<Product>, AppError> {
        self.products.list(business_id, false, filter).await
    }

    pub async fn get_product(&self, business_id: i64, id: i64) -> Result<Product, AppError> {
        self.products
            .find_in_business(&self.pool, business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto"))
    }

    pub async fn create_product(&self, business_id: i64, payload: CreateProductPayload) -> Result<Product, AppError> {
        let price_cents = parse_cents("priceCents", &payload.price_cents)?;

        if let Some(category_id) = payload.category_id {
            self.ensure_usable_category(&self.pool, business_id, category_id).await?;
        }

        let fields = ProductFields {
            category_id: payload.category_id,
            name: payload.name.trim().to_string(),
            subtitle: payload.subtitle,
            sku: payload.sku,
            product_type: payload.product_type,
            price_cents,
            description: payload.description,
            features: payload.features,
            image_url: default_image_url(payload.image_url, &payload.images),
            images: payload.images,
            stock: payload.stock,
            tags: payload.tags,
            seo_title: payload.seo_title,
            seo_description: payload.seo_description,
            is_active: payload.is_active.unwrap_or(true),
        };

        let product = self.products.create(business_id, &fields).await?;
        tracing::info!(business_id, product_id = product.id, "📦 Produto criado");
        Ok(product)
    }

    /// Roda numa transação com a linha travada. Falhas de banco viram `BadRequest`
    /// genérico para o cliente; a causa fica no log.
    pub async fn update_product(
        &self,
        business_id: i64,
        id: i64,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        self.update_product_tx(business_id, id, payload)
            .await
            .map_err(|e| match e {
                AppError::DatabaseError(cause) => {
                    tracing::error!(business_id, product_id = id, "Falha ao atualizar produto: {:?}", cause);
                    AppError::BadRequest(PRODUCT_UPDATE_FAILED.into())
                }
                other => other,
            })
    }

    async fn update_product_tx(
        &self,
        business_id: i64,
        id: i64,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .products
            .find_for_update(&mut *tx, business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto"))?;

        let price_cents = match payload.price_cents.as_deref() {
            Some(raw) => Some(parse_cents("priceCents", raw)?),
            None => None,
        };

        if let Some(category_id) = payload.category_id {
            if current.category_id != Some(category_id) {
                self.ensure_usable_category(&mut *tx, business_id, category_id).await?;
            }
        }

        let fields = merge_product(ProductFields::from_product(&current), payload, price_cents);
        let product = self.products.update(&mut *tx, business_id, id, &fields).await?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn archive_product(&self, business_id: i64, id: i64) -> Result<Product, AppError> {
        let product = self
            .products
            .archive(business_id, id)
            .await?
            .ok_or_else(|| AppError::not_found("Produto"))?;
        tracing::info!(business_id, product_id = id, "📦 Produto arquivado");
        Ok(product)
    }

    async fn ensure_usable_category<'e, E>(&self, executor: E, business_id: i64, category_id: i64) -> Result<(), AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let category = self
            .categories
            .find_in_business(executor, business_id, category_id)
            .await?
            .ok_or_else(|| AppError::not_found("Categoria"))?;

        if !category.is_active {
            return Err(AppError::BadRequest(
                "A categoria está arquivada e não pode receber produtos.".into(),
            ));
        }
        Ok(())
    }

    // =========================================================================
    //  VITRINE PÚBLICA (sem autenticação, loja resolvida na subida)
    // =========================================================================

    pub async fn public_categories(&self, storefront: Option<i64>) -> Result<Vec<Category>, AppError> {
        self.categories.list(storefront_id(storefront)?, false).await
    }

    pub async fn public_category(&self, storefront: Option<i64>, slug: &str) -> Result<CategoryWithProducts, AppError> {
        let business_id = storefront_id(storefront)?;

        let category = self
            .categories
            .find_active_by_slug(business_id, slug)
            .await?
            .ok_or_else(|| AppError::not_found("Categoria"))?;

        let filter = ProductQuery { category_id: Some(category.id), q: None };
        let products = self.products.list(business_id, true, &filter).await?;

        Ok(CategoryWithProducts { category, products })
    }

    pub async fn public_products(&self, storefront: Option<i64>, filter: &ProductQuery) -> Result<Vec<Product>, AppError> {
        self.products.list(storefront_id(storefront)?, true, filter).await
    }

    pub async fn public_product(&self, storefront: Option<i64>, id: i64) -> Result<Product, AppError> {
        self.products
            .find_in_business(&self.pool, storefront_id(storefront)?, id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::not_found("Produto"))
    }
}

fn storefront_id(storefront: Option<i64>) -> Result<i64, AppError> {
    storefront.ok_or_else(|| AppError::not_found("Loja"))
}

fn has_active_products(count: i64) -> AppError {
    AppError::BadRequest(format!(
        "A categoria ainda possui {} produto(s) ativo(s). Mova-os para outra categoria antes de arquivar.",
        count
    ))
}

/// Slug explícito (normalizado) ou derivado do nome.
fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<String, AppError> {
    let source = explicit.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(name);
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "Não foi possível gerar um slug válido para a categoria.".into(),
        ));
    }
    Ok(slug)
}

fn default_image_url(image_url: Option<String>, images: &[String]) -> Option<String> {
    image_url
        .filter(|u| !u.trim().is_empty())
        .or_else(|| images.first().cloned())
}

fn merge_product(mut fields: ProductFields, payload: UpdateProductPayload, price_cents: Option<i64>) -> ProductFields {
    if let Some(category_id) = payload.category_id {
        fields.category_id = Some(category_id);
    }
    if let Some(name) = payload.name {
        fields.name = name.trim().to_string();
    }
    if payload.subtitle.is_some() {
        fields.subtitle = payload.subtitle;
    }
    if payload.sku.is_some() {
        fields.sku = payload.sku;
    }
    if let Some(product_type) = payload.product_type {
        fields.product_type = product_type;
    }
    if let Some(price_cents) = price_cents {
        fields.price_cents = price_cents;
    }
    if payload.description.is_some() {
        fields.description = payload.description;
    }
    if let Some(features) = payload.features {
        fields.features = features;
    }
    if let Some(images) = payload.images {
        fields.images = images;
    }
    if let Some(stock) = payload.stock {
        fields.stock = Some(stock);
    }
    if let Some(tags) = payload.tags {
        fields.tags = tags;
    }
    if payload.seo_title.is_some() {
        fields.seo_title = payload.seo_title;
    }
    if payload.seo_description.is_some() {
        fields.seo_description = payload.seo_description;
    }
    if let Some(is_active) = payload.is_active {
        fields.is_active = is_active;
    }

    fields.image_url = default_image_url(payload.image_url.or(fields.image_url), &fields.images);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ProductType;

    fn fields() -> ProductFields {
        ProductFields {
            category_id: Some(1),
            name: "Çay".into(),
            subtitle: None,
            sku: Some("CAY-1".into()),
            product_type: ProductType::Physical,
            price_cents: 1000,
            description: None,
            features: vec![],
            image_url: None,
            images: vec![],
            stock: Some(5),
            tags: vec!["quente".into()],
            seo_title: None,
            seo_description: None,
            is_active: true,
        }
    }

    #[test]
    fn slug_comes_from_name_when_not_given() {
        assert_eq!(resolve_slug(None, "Sıcak İçecekler").unwrap(), "sicak-icecekler");
        assert_eq!(resolve_slug(Some("  "), "Çorba").unwrap(), "corba");
        assert_eq!(resolve_slug(Some("Meu Slug!"), "ignorado").unwrap(), "meu-slug");
    }

    #[test]
    fn slug_without_alphanumerics_is_rejected() {
        assert!(matches!(resolve_slug(None, "!!!"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn image_url_defaults_to_first_image() {
        let images = vec!["/a.png".to_string(), "/b.png".to_string()];
        assert_eq!(default_image_url(None, &images), Some("/a.png".into()));
        assert_eq!(default_image_url(Some("/x.png".into()), &images), Some("/x.png".into()));
        assert_eq!(default_image_url(Some("".into()), &images), Some("/a.png".into()));
        assert_eq!(default_image_url(None, &[]), None);
    }

    #[test]
    fn merge_only_touches_given_fields() {
        let payload = UpdateProductPayload {
            name: Some(" Chá ".into()),
            images: Some(vec!["/cha.png".into()]),
            ..Default::default()
        };
        let merged = merge_product(fields(), payload, Some(500));

        assert_eq!(merged.name, "Chá");
        assert_eq!(merged.price_cents, 500);
        assert_eq!(merged.sku.as_deref(), Some("CAY-1"));
        assert_eq!(merged.stock, Some(5));
        assert_eq!(merged.image_url.as_deref(), Some("/cha.png"));
        assert_eq!(merged.tags, vec!["quente".to_string()]);
    }

    #[test]
    fn merge_keeps_explicit_image_url() {
        let mut base = fields();
        base.image_url = Some("/capa.png".into());
        let payload = UpdateProductPayload {
            images: Some(vec!["/outra.png".into()]),
            ..Default::default()
        };
        assert_eq!(merge_product(base, payload, None).image_url.as_deref(), Some("/capa.png"));
    }

    #[test]
    fn missing_storefront_is_not_found() {
        assert!(matches!(storefront_id(None), Err(AppError::NotFound(_))));
        assert_eq!(storefront_id(Some(4)).unwrap(), 4);
    }
}
