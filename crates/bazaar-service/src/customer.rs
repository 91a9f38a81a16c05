//! # Customer Service
//!
//! Customer CRUD. The existence check other services rely on lives on the
//! repository; this service is the management surface.

use chrono::Utc;
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use bazaar_core::{validation, Customer};
use bazaar_db::repository::customer::generate_customer_id;
use bazaar_db::CustomerRepository;

/// Input for creating or updating a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Customer operations.
#[derive(Debug, Clone)]
pub struct CustomerService {
    customers: CustomerRepository,
}

impl CustomerService {
    /// Creates a new CustomerService over the given repository.
    pub fn new(customers: CustomerRepository) -> Self {
        CustomerService { customers }
    }

    /// Registers a new customer.
    pub async fn create(&self, new: NewCustomer) -> ServiceResult<Customer> {
        validation::validate_customer_name(&new.name)?;
        validation::validate_email(&new.email)?;

        let now = Utc::now();
        let customer = Customer {
            id: generate_customer_id(),
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone_number: new.phone_number,
            address: new.address,
            created_at: now,
            updated_at: now,
        };

        let customer = self.customers.insert(&customer).await?;
        info!(customer_id = %customer.id, "Customer created");

        Ok(customer)
    }

    /// Gets a customer by id.
    pub async fn get(&self, id: &str) -> ServiceResult<Customer> {
        self.customers
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", id))
    }

    /// Lists all customers.
    pub async fn list(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.list_all().await?)
    }

    /// Replaces a customer's profile fields.
    pub async fn update(&self, id: &str, update: NewCustomer) -> ServiceResult<Customer> {
        validation::validate_customer_name(&update.name)?;
        validation::validate_email(&update.email)?;

        let mut customer = self.get(id).await?;
        customer.name = update.name.trim().to_string();
        customer.email = update.email.trim().to_string();
        customer.phone_number = update.phone_number;
        customer.address = update.address;

        self.customers.update(&customer).await?;
        info!(customer_id = %id, "Customer updated");

        self.get(id).await
    }

    /// Deletes a customer.
    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.customers.delete(id).await?;
        info!(customer_id = %id, "Customer deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
