//! Domain models for the customer/order API.
//!
//! `Customer` and `Order` map to the `customers` and `orders` tables. Both
//! implement [`Resource`], which is what lets the repositories and the route
//! handlers be written once for the two resource types.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::validation::{FieldRules, CUSTOMER_RULES, ORDER_RULES};

// ============================================================================
// Resource contract
// ============================================================================

/// A CRUD resource owned by the user that created it.
pub trait Resource: Serialize + Clone + Send + Sync + Unpin + 'static {
    /// The mutable, validated fields of the resource.
    type Fields: DeserializeOwned + Clone + Send + Sync + 'static;

    /// Lowercase name used in route paths and messages ("customer").
    const SLUG: &'static str;
    /// Capitalized name used in messages ("Customer").
    const LABEL: &'static str;
    /// Validation rules applied on Store and Update.
    const RULES: &'static [FieldRules];

    fn id(&self) -> i64;
    fn name(&self) -> &str;

    /// Build a new row from validated fields.
    fn build(id: i64, owner_user_id: i64, fields: Self::Fields, now: DateTime<Utc>) -> Self;

    /// Overwrite the mutable fields in place.
    fn apply(&mut self, fields: Self::Fields, now: DateTime<Utc>);
}

// ============================================================================
// Database Models (sqlx::FromRow)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub owner_user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerFields {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Resource for Customer {
    type Fields = CustomerFields;

    const SLUG: &'static str = "customer";
    const LABEL: &'static str = "Customer";
    const RULES: &'static [FieldRules] = CUSTOMER_RULES;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn build(id: i64, owner_user_id: i64, fields: CustomerFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            address: fields.address,
            phone: fields.phone,
            owner_user_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: CustomerFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.address = fields.address;
        self.phone = fields.phone;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub price: f64,
    pub owner_user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFields {
    pub name: String,
    pub quantity: f64,
    pub price: f64,
}

impl Resource for Order {
    type Fields = OrderFields;

    const SLUG: &'static str = "order";
    const LABEL: &'static str = "Order";
    const RULES: &'static [FieldRules] = ORDER_RULES;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn build(id: i64, owner_user_id: i64, fields: OrderFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            quantity: fields.quantity,
            price: fields.price,
            owner_user_id,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, fields: OrderFields, now: DateTime<Utc>) {
        self.name = fields.name;
        self.quantity = fields.quantity;
        self.price = fields.price;
        self.updated_at = now;
    }
}

/// A registered account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a user about to be inserted; `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

// ============================================================================
// Request Models (Deserialize from JSON input)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Query string of the `*WithPaginate` routes. The page is kept as text so
/// that garbage values fall back to the first page instead of failing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

// ============================================================================
// Response Models
// ============================================================================

/// Generic API response wrapper: `{ success, message?, data? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}
