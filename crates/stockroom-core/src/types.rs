//! # Domain Types
//!
//! The inventory entities and the contract every repository relies on.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Supplier     │◄──│    Product      │   │    Storage      │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │   │  id             │   │  id             │        │
//! │  │  name           │   │  name           │   │  name           │        │
//! │  │  email, phone   │   │  lowest_price   │   │  address        │        │
//! │  └─────────────────┘   │  highest_price  │   └────────▲────────┘        │
//! │                        └────────▲────────┘            │                 │
//! │                                 │                     │                 │
//! │                        ┌────────┴─────────────────────┴────────┐        │
//! │                        │  Stock     (product × storage)        │        │
//! │                        │  Validity  (product × storage × date) │        │
//! │                        └───────────────────────────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │      User       │   role: admin | manager | clerk                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Record Equality
//! Each entity compares a fixed list of named fields in [`Entity::same_record`].
//! Timestamps are not part of it, so re-saving identical data is a no-op.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::{
    validate_email, validate_id, validate_name, validate_non_negative, validate_optional_text,
    validate_price_range, validate_username, ValidationResult,
};

// =============================================================================
// Entity Contract
// =============================================================================

/// What the generic repository needs to know about a table-backed type.
pub trait Entity {
    /// Display name used in errors and logs.
    const NAME: &'static str;

    /// Table name.
    const TABLE: &'static str;

    /// Columns selected on reads, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// Columns accepted in filters and sorts.
    const FILTERABLE: &'static [&'static str];

    fn id(&self) -> i64;

    /// Compares the persisted fields, ignoring timestamps.
    fn same_record(&self, other: &Self) -> bool;

    /// Checks field rules before a write.
    fn validate(&self) -> ValidationResult<()>;
}

// =============================================================================
// Product
// =============================================================================

/// A product that can be stocked.
///
/// Prices are integers in the smallest currency unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub lowest_price: i64,
    pub highest_price: i64,
    pub supplier_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// A product that has not been stored yet (`id` 0).
    pub fn draft(name: impl Into<String>, lowest_price: i64, highest_price: i64) -> Self {
        let now = Utc::now();
        Product {
            id: 0,
            name: name.into(),
            description: None,
            lowest_price,
            highest_price,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_supplier(mut self, supplier_id: i64) -> Self {
        self.supplier_id = Some(supplier_id);
        self
    }
}

impl Entity for Product {
    const NAME: &'static str = "Product";
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "lowest_price",
        "highest_price",
        "supplier_id",
        "created_at",
        "updated_at",
    ];
    const FILTERABLE: &'static [&'static str] = Self::COLUMNS;

    fn id(&self) -> i64 {
        self.id
    }

    fn same_record(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.description == other.description
            && self.lowest_price == other.lowest_price
            && self.highest_price == other.highest_price
            && self.supplier_id == other.supplier_id
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_optional_text("description", self.description.as_deref(), 2000)?;
        validate_price_range(self.lowest_price, self.highest_price)?;
        if let Some(supplier_id) = self.supplier_id {
            validate_id("supplier_id", supplier_id)?;
        }
        Ok(())
    }
}

// =============================================================================
// Storage
// =============================================================================

/// A physical location holding stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Storage {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
}

impl Storage {
    pub fn draft(name: impl Into<String>, address: Option<String>) -> Self {
        Storage {
            id: 0,
            name: name.into(),
            address,
        }
    }
}

impl Entity for Storage {
    const NAME: &'static str = "Storage";
    const TABLE: &'static str = "storages";
    const COLUMNS: &'static [&'static str] = &["id", "name", "address"];
    const FILTERABLE: &'static [&'static str] = Self::COLUMNS;

    fn id(&self) -> i64 {
        self.id
    }

    fn same_record(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.address == other.address
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        validate_optional_text("address", self.address.as_deref(), 500)
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Supplier {
    pub fn draft(name: impl Into<String>) -> Self {
        Supplier {
            id: 0,
            name: name.into(),
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl Entity for Supplier {
    const NAME: &'static str = "Supplier";
    const TABLE: &'static str = "suppliers";
    const COLUMNS: &'static [&'static str] = &["id", "name", "email", "phone"];
    const FILTERABLE: &'static [&'static str] = Self::COLUMNS;

    fn id(&self) -> i64 {
        self.id
    }

    fn same_record(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.email == other.email
            && self.phone == other.phone
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_name("name", &self.name)?;
        if let Some(email) = self.email.as_deref() {
            validate_email(email)?;
        }
        validate_optional_text("phone", self.phone.as_deref(), 40)
    }
}

// =============================================================================
// User
// =============================================================================

/// Access level of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Clerk,
}

impl UserRole {
    /// Stored text form.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Clerk => "clerk",
        }
    }
}

/// A user account. The password arrives already hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn draft(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        User {
            id: 0,
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

impl Entity for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "password_hash",
        "role",
        "is_active",
        "created_at",
    ];
    // password_hash is never filterable or sortable.
    const FILTERABLE: &'static [&'static str] =
        &["id", "username", "email", "role", "is_active", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn same_record(&self, other: &Self) -> bool {
        self.id == other.id
            && self.username == other.username
            && self.email == other.email
            && self.password_hash == other.password_hash
            && self.role == other.role
            && self.is_active == other.is_active
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        if self.password_hash.is_empty() {
            return Err(ValidationError::Required {
                field: "password_hash".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Quantity of one product held in one storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stock {
    pub id: i64,
    pub product_id: i64,
    pub storage_id: i64,
    pub quantity: i64,
}

impl Stock {
    pub fn draft(product_id: i64, storage_id: i64, quantity: i64) -> Self {
        Stock {
            id: 0,
            product_id,
            storage_id,
            quantity,
        }
    }
}

impl Entity for Stock {
    const NAME: &'static str = "Stock";
    const TABLE: &'static str = "stocks";
    const COLUMNS: &'static [&'static str] = &["id", "product_id", "storage_id", "quantity"];
    const FILTERABLE: &'static [&'static str] = Self::COLUMNS;

    fn id(&self) -> i64 {
        self.id
    }

    fn same_record(&self, other: &Self) -> bool {
        self.id == other.id
            && self.product_id == other.product_id
            && self.storage_id == other.storage_id
            && self.quantity == other.quantity
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id("product_id", self.product_id)?;
        validate_id("storage_id", self.storage_id)?;
        validate_non_negative("quantity", self.quantity)
    }
}

// =============================================================================
// Validity
// =============================================================================

/// A batch of one product in one storage that expires on a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Validity {
    pub id: i64,
    pub product_id: i64,
    pub storage_id: i64,
    pub expiration_date: NaiveDate,
    pub quantity: i64,
}

impl Validity {
    pub fn draft(
        product_id: i64,
        storage_id: i64,
        expiration_date: NaiveDate,
        quantity: i64,
    ) -> Self {
        Validity {
            id: 0,
            product_id,
            storage_id,
            expiration_date,
            quantity,
        }
    }

    pub fn is_expired_on(&self, day: NaiveDate) -> bool {
        self.expiration_date < day
    }
}

impl Entity for Validity {
    const NAME: &'static str = "Validity";
    const TABLE: &'static str = "validities";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "product_id",
        "storage_id",
        "expiration_date",
        "quantity",
    ];
    const FILTERABLE: &'static [&'static str] = Self::COLUMNS;

    fn id(&self) -> i64 {
        self.id
    }

    fn same_record(&self, other: &Self) -> bool {
        self.id == other.id
            && self.product_id == other.product_id
            && self.storage_id == other.storage_id
            && self.expiration_date == other.expiration_date
            && self.quantity == other.quantity
    }

    fn validate(&self) -> ValidationResult<()> {
        validate_id("product_id", self.product_id)?;
        validate_id("storage_id", self.storage_id)?;
        validate_non_negative("quantity", self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cola() -> Product {
        Product::draft("Cola 330ml", 250, 300).with_description("canned")
    }

    #[test]
    fn test_same_record_ignores_timestamps() {
        let a = cola();
        let mut b = a.clone();
        b.updated_at = b.updated_at + chrono::Duration::hours(1);
        assert!(a.same_record(&b));

        b.highest_price = 320;
        assert!(!a.same_record(&b));
    }

    #[test]
    fn test_product_validation() {
        assert!(cola().validate().is_ok());

        let inverted = Product::draft("Cola", 300, 250);
        assert!(matches!(
            inverted.validate(),
            Err(ValidationError::InvalidFormat { .. })
        ));

        let unnamed = Product::draft("  ", 1, 2);
        assert!(matches!(unnamed.validate(), Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_user_filterable_excludes_password_hash() {
        assert!(User::COLUMNS.contains(&"password_hash"));
        assert!(!User::FILTERABLE.contains(&"password_hash"));
    }

    #[test]
    fn test_user_hash_is_not_serialized() {
        let user = User::draft("ann", "ann@example.com", "$argon2id$hash", UserRole::Manager);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"manager\""));
    }

    #[test]
    fn test_stock_rejects_negative_quantity() {
        let stock = Stock {
            id: 0,
            product_id: 1,
            storage_id: 1,
            quantity: -1,
        };
        assert!(stock.validate().is_err());
    }

    #[test]
    fn test_validity_expiry() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
        let batch = Validity::draft(1, 1, day(10), 5);
        assert!(!batch.is_expired_on(day(10)));
        assert!(batch.is_expired_on(day(11)));
    }

    #[test]
    fn test_user_role_default() {
        assert_eq!(UserRole::default(), UserRole::Clerk);
    }
}
