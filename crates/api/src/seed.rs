//! Sample customers and menu items for a fresh installation.

use domain::{CustomerService, DomainError, MenuService, NewCustomer, NewMenuItem};
use rust_decimal::Decimal;
use store::{MenuCatalog, RestaurantStore};

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("John Doe", "john@example.com", "123-456-7890"),
    ("Jane Smith", "jane@example.com", "098-765-4321"),
];

/// Name, description, price in cents and category.
const MENU: &[(&str, &str, i64, &str)] = &[
    (
        "Margherita Pizza",
        "Classic pizza with tomato sauce, mozzarella, and basil",
        1299,
        "Pizza",
    ),
    (
        "Pepperoni Pizza",
        "Pizza topped with pepperoni and mozzarella",
        1499,
        "Pizza",
    ),
    (
        "Caesar Salad",
        "Romaine lettuce with Caesar dressing, croutons, and parmesan",
        999,
        "Salad",
    ),
    (
        "Chicken Burger",
        "Grilled chicken breast with lettuce and tomato",
        1099,
        "Burger",
    ),
    (
        "Chocolate Brownie",
        "Warm chocolate brownie with vanilla ice cream",
        699,
        "Dessert",
    ),
    ("French Fries", "Crispy golden fries", 499, "Sides"),
    (
        "Pasta Carbonara",
        "Spaghetti with creamy sauce, bacon, and parmesan",
        1499,
        "Pasta",
    ),
    ("Iced Tea", "Refreshing iced tea", 299, "Beverages"),
];

/// What a seeding run added.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub customers: usize,
    pub menu_items: usize,
}

/// Loads the sample data into an empty directory and catalog.
///
/// Customers are only added when none exist and menu items only when no
/// item is available, so running this against a populated store is a no-op.
/// Sample items already in the catalog are skipped, even when they have
/// been marked unavailable.
pub async fn seed_sample_data<S: RestaurantStore>(store: &S) -> Result<SeedReport, DomainError> {
    let customers = CustomerService::new(store.clone());
    let menu = MenuService::new(store.clone());
    let mut report = SeedReport::default();

    if customers.list().await?.is_empty() {
        for (name, email, phone) in CUSTOMERS {
            customers
                .register(NewCustomer::new(*name, *email, *phone))
                .await?;
            report.customers += 1;
        }
    }

    if menu.list_available().await?.is_empty() {
        for (name, description, cents, category) in MENU {
            if store.find_menu_item_by_name(name).await?.is_some() {
                continue;
            }
            menu.create(
                NewMenuItem::new(*name, Decimal::new(*cents, 2), *category)
                    .with_description(*description),
            )
            .await?;
            report.menu_items += 1;
        }
    }

    tracing::info!(
        customers = report.customers,
        menu_items = report.menu_items,
        "sample data loaded"
    );
    Ok(report)
}
