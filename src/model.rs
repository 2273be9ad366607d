//! Customer row, request payloads and the paginated listing shape.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Table holding customer rows.
pub const CUSTOMERS_TABLE: &str = "customers";

/// Unique constraint on `customers.email`.
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "customers_email_key";

/// Upper bound for `name` and `email` (`VARCHAR(255)`).
pub const MAX_TEXT_LEN: usize = 255;

/// One persisted customer. `id` is assigned by the store and never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Create payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewCustomer {
    pub name: String,
    pub age: i32,
    pub email: String,
}

/// Partial update payload. Omitted fields keep their stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomerPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.email.is_none()
    }

    /// Apply supplied fields onto `customer`.
    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(age) = self.age {
            customer.age = age;
        }
        if let Some(email) = &self.email {
            customer.email = email.clone();
        }
    }
}

impl Customer {
    pub fn from_new(id: i32, new: NewCustomer) -> Self {
        Customer {
            id,
            name: new.name,
            age: new.age,
            email: new.email,
        }
    }
}

/// A page of rows plus the total number of rows in the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Customer {
        Customer {
            id: 7,
            name: "Ada Lovelace".into(),
            age: 36,
            email: "ada@example.com".into(),
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let patch = CustomerPatch::default();
        assert!(patch.is_empty());
        let mut c = sample();
        patch.apply_to(&mut c);
        assert_eq!(c, sample());
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let patch: CustomerPatch = serde_json::from_str(r#"{"age": 40}"#).unwrap();
        assert!(!patch.is_empty());
        let mut c = sample();
        patch.apply_to(&mut c);
        assert_eq!(c.age, 40);
        assert_eq!(c.name, "Ada Lovelace");
        assert_eq!(c.email, "ada@example.com");
        assert_eq!(c.id, 7);
    }
}
