//! Menu catalog service.

use common::MenuItemId;
use rust_decimal::Decimal;
use serde::Deserialize;
use store::{MenuCatalog, MenuItemRecord, NewMenuItemRecord, StoreError, constraints};

use crate::error::DomainError;
use crate::order::Money;

/// Payload for creating or replacing a menu item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default = "available_by_default")]
    pub available: bool,
}

fn available_by_default() -> bool {
    true
}

impl NewMenuItem {
    /// Creates an available menu item without a description.
    pub fn new(name: impl Into<String>, price: Decimal, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            category: category.into(),
            available: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    fn validate(self) -> Result<NewMenuItemRecord, DomainError> {
        let name = self.name.trim().to_string();
        let category = self.category.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::Validation("name is required".to_string()));
        }
        if category.is_empty() {
            return Err(DomainError::Validation("category is required".to_string()));
        }

        let price = Money::from_decimal(self.price)
            .filter(|price| !price.is_negative() && *price <= Money::MAX)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "price {} must be a non-negative amount with at most two decimals, up to {}",
                    self.price,
                    Money::MAX
                ))
            })?;

        Ok(NewMenuItemRecord {
            name,
            description: self.description.trim().to_string(),
            price: price.amount(),
            category,
            available: self.available,
        })
    }
}

/// Service for the menu that orders are priced from.
#[derive(Clone)]
pub struct MenuService<S> {
    store: S,
}

impl<S: MenuCatalog> MenuService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns every item that can currently be ordered.
    #[tracing::instrument(skip(self))]
    pub async fn list_available(&self) -> Result<Vec<MenuItemRecord>, DomainError> {
        Ok(self.store.list_menu_items(true).await?)
    }

    /// Returns the distinct categories, sorted.
    #[tracing::instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.store.list_categories().await?)
    }

    /// Returns the available items of one category.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<MenuItemRecord>, DomainError> {
        let mut items = self.store.list_menu_items(true).await?;
        items.retain(|item| item.category == category);
        Ok(items)
    }

    /// Fetches an available item by id.
    ///
    /// Unavailable items are reported as missing, the same way order
    /// creation by id treats them.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: MenuItemId) -> Result<MenuItemRecord, DomainError> {
        self.store
            .find_menu_item_by_id(id)
            .await?
            .filter(|item| item.available)
            .ok_or_else(|| not_found(id))
    }

    /// Fetches an item by name, ignoring case and availability.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<MenuItemRecord, DomainError> {
        self.store
            .find_menu_item_by_name(name)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("menu item '{name}' not found")))
    }

    #[tracing::instrument(skip(self, item), fields(name = %item.name))]
    pub async fn create(&self, item: NewMenuItem) -> Result<MenuItemRecord, DomainError> {
        let record = item.validate()?;
        let name = record.name.clone();
        let created = self
            .store
            .insert_menu_item(record)
            .await
            .map_err(|e| write_error(e, &name))?;

        tracing::info!(menu_item_id = %created.id, "menu item created");
        Ok(created)
    }

    #[tracing::instrument(skip(self, item))]
    pub async fn update(
        &self,
        id: MenuItemId,
        item: NewMenuItem,
    ) -> Result<MenuItemRecord, DomainError> {
        let record = item.validate()?;
        let name = record.name.clone();
        self.store
            .update_menu_item(id, record)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => not_found(id),
                e => write_error(e, &name),
            })
    }

    /// Deletes a menu item. Items that appear on orders must be marked
    /// unavailable instead.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: MenuItemId) -> Result<(), DomainError> {
        self.store.delete_menu_item(id).await.map_err(|e| match e {
            StoreError::NotFound(_) => not_found(id),
            StoreError::ForeignKey { .. } => DomainError::Conflict(format!(
                "menu item {id} is used by orders; mark it unavailable instead"
            )),
            e => e.into(),
        })?;
        tracing::info!(menu_item_id = %id, "menu item deleted");
        Ok(())
    }
}

fn not_found(id: MenuItemId) -> DomainError {
    DomainError::NotFound(format!("menu item not found with id {id}"))
}

fn write_error(e: StoreError, name: &str) -> DomainError {
    if e.is_duplicate_of(constraints::MENU_ITEMS_NAME_KEY) {
        DomainError::Conflict(format!("menu item '{name}' already exists"))
    } else {
        e.into()
    }
}

#[cfg(test)]
mod tests {
    use store::InMemoryStore;

    use super::*;
    use crate::ErrorKind;

    fn service() -> MenuService<InMemoryStore> {
        MenuService::new(InMemoryStore::new())
    }

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[tokio::test]
    async fn test_create_rescales_price() {
        let service = service();
        let item = service
            .create(NewMenuItem::new("Iced Tea", Decimal::new(3, 0), "Beverages"))
            .await
            .unwrap();
        assert_eq!(item.price.to_string(), "3.00");
    }

    #[tokio::test]
    async fn test_create_validates() {
        let service = service();

        let err = service
            .create(NewMenuItem::new(" ", price(100), "Pizza"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = service
            .create(NewMenuItem::new("Soup", price(-100), "Soups"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = service
            .create(NewMenuItem::new("Soup", Decimal::new(1999, 3), "Soups"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err = service
            .create(NewMenuItem::new("Caviar", price(10_000_000_000), "Specials"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(
            err.to_string(),
            "price 100000000.00 must be a non-negative amount with at most two decimals, up to 99999999.99"
        );

        let item = service
            .create(NewMenuItem::new("Caviar", price(9_999_999_999), "Specials"))
            .await
            .unwrap();
        assert_eq!(item.price.to_string(), "99999999.99");
    }

    #[tokio::test]
    async fn test_names_are_unique_ignoring_case() {
        let service = service();
        service
            .create(NewMenuItem::new("Caesar Salad", price(999), "Salad"))
            .await
            .unwrap();

        let err = service
            .create(NewMenuItem::new("caesar salad", price(899), "Salad"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "menu item 'caesar salad' already exists");
    }

    #[tokio::test]
    async fn test_unavailable_items_are_hidden() {
        let service = service();
        let pizza = service
            .create(NewMenuItem::new("Margherita Pizza", price(1299), "Pizza"))
            .await
            .unwrap();
        let special = service
            .create(NewMenuItem::new("Truffle Pizza", price(2499), "Pizza").unavailable())
            .await
            .unwrap();
        service
            .create(NewMenuItem::new("Iced Tea", price(299), "Beverages"))
            .await
            .unwrap();

        let pizzas = service.list_by_category("Pizza").await.unwrap();
        assert_eq!(pizzas, vec![pizza.clone()]);
        assert_eq!(service.list_available().await.unwrap().len(), 2);
        assert_eq!(
            service.categories().await.unwrap(),
            vec!["Beverages".to_string(), "Pizza".to_string()]
        );

        assert_eq!(service.get(pizza.id).await.unwrap(), pizza);
        assert_eq!(
            service.get(special.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            service.get_by_name("truffle pizza").await.unwrap().id,
            special.id
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let service = service();
        let item = service
            .create(NewMenuItem::new("Fries", price(499), "Sides"))
            .await
            .unwrap();

        let updated = service
            .update(
                item.id,
                NewMenuItem::new("French Fries", price(549), "Sides").with_description("Crispy"),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "French Fries");
        assert_eq!(updated.description, "Crispy");

        service.delete(item.id).await.unwrap();
        assert_eq!(
            service.delete(item.id).await.unwrap_err().to_string(),
            format!("menu item not found with id {}", item.id)
        );
    }
}
