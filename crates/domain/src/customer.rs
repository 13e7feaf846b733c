//! Customer directory service.

use chrono::{SubsecRound, Utc};
use common::CustomerId;
use serde::Deserialize;
use store::{CustomerDirectory, CustomerRecord, NewCustomerRecord, StoreError, constraints};

use crate::error::DomainError;

/// Payload for registering or replacing a customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

impl NewCustomer {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Trims every field and checks that the customer is well formed.
    fn validate(self) -> Result<Self, DomainError> {
        let customer = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
        };

        for (field, value) in [
            ("name", &customer.name),
            ("email", &customer.email),
            ("phone number", &customer.phone_number),
        ] {
            if value.is_empty() {
                return Err(DomainError::Validation(format!("{field} is required")));
            }
        }

        match customer.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(customer),
            _ => Err(DomainError::Validation("email should be valid".to_string())),
        }
    }
}

/// Service for the registered customers that orders are placed for.
#[derive(Clone)]
pub struct CustomerService<S> {
    store: S,
}

impl<S: CustomerDirectory> CustomerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new customer.
    #[tracing::instrument(skip(self, customer), fields(phone = %customer.phone_number))]
    pub async fn register(&self, customer: NewCustomer) -> Result<CustomerRecord, DomainError> {
        let customer = customer.validate()?;
        let record = self
            .store
            .insert_customer(NewCustomerRecord {
                name: customer.name,
                email: customer.email,
                phone_number: customer.phone_number,
                created_at: Utc::now().trunc_subsecs(6),
            })
            .await
            .map_err(write_error)?;

        tracing::info!(customer_id = %record.id, "customer registered");
        Ok(record)
    }

    /// Replaces the details of a customer, keeping the registration time.
    #[tracing::instrument(skip(self, customer))]
    pub async fn update(
        &self,
        id: CustomerId,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, DomainError> {
        let customer = customer.validate()?;
        let existing = self.get_by_id(id).await?;

        self.store
            .update_customer(
                id,
                NewCustomerRecord {
                    name: customer.name,
                    email: customer.email,
                    phone_number: customer.phone_number,
                    created_at: existing.created_at,
                },
            )
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => not_found(id),
                e => write_error(e),
            })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: CustomerId) -> Result<CustomerRecord, DomainError> {
        self.store
            .find_customer_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<CustomerRecord, DomainError> {
        self.store
            .find_customer_by_email(email)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("customer not found with email {email}")))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_phone(&self, phone: &str) -> Result<CustomerRecord, DomainError> {
        self.store
            .find_customer_by_phone(phone)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("customer not found with phone {phone}")))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CustomerRecord>, DomainError> {
        Ok(self.store.list_customers().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.store.find_customer_by_email(email).await?.is_some())
    }

    #[tracing::instrument(skip(self))]
    pub async fn phone_exists(&self, phone: &str) -> Result<bool, DomainError> {
        Ok(self.store.find_customer_by_phone(phone).await?.is_some())
    }

    /// Deletes a customer. Customers who placed orders cannot be deleted.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: CustomerId) -> Result<(), DomainError> {
        self.store.delete_customer(id).await.map_err(|e| match e {
            StoreError::NotFound(_) => not_found(id),
            e => write_error(e),
        })?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_by_phone(&self, phone: &str) -> Result<(), DomainError> {
        let customer = self.get_by_phone(phone).await?;
        self.delete(customer.id).await
    }
}

fn not_found(id: CustomerId) -> DomainError {
    DomainError::NotFound(format!("customer not found with id {id}"))
}

/// Turns constraint violations into messages a caller can act on.
fn write_error(e: StoreError) -> DomainError {
    if e.is_duplicate_of(constraints::CUSTOMERS_EMAIL_KEY) {
        DomainError::Conflict("email already exists".to_string())
    } else if e.is_duplicate_of(constraints::CUSTOMERS_PHONE_KEY) {
        DomainError::Conflict("phone number already exists".to_string())
    } else if let StoreError::ForeignKey { .. } = e {
        DomainError::Conflict("customer has orders and cannot be deleted".to_string())
    } else {
        e.into()
    }
}
