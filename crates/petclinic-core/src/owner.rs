//! # Owner Records
//!
//! - [`Owner`]: a persisted clinic customer with an assigned [`OwnerId`].
//! - [`OwnerForm`]: the raw, unvalidated form submission. Missing fields bind
//!   as empty strings.
//! - [`OwnerFields`]: the validated descriptive fields. Only
//!   [`OwnerForm::validate`] can produce one.

use serde::{Deserialize, Serialize};

use crate::validation::{require_digits, require_not_empty, ValidationErrors};

/// Maximum significant integer digits in a telephone number.
pub const TELEPHONE_INTEGER_DIGITS: usize = 10;

/// Telephone numbers carry no fraction digits.
pub const TELEPHONE_FRACTION_DIGITS: usize = 0;

/// Identifier assigned by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i32);

impl OwnerId {
    pub fn get(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: OwnerId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

impl Owner {
    /// First and last name separated by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The owner's current values as an edit form.
    pub fn to_form(&self) -> OwnerForm {
        OwnerForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            telephone: self.telephone.clone(),
        }
    }
}

/// Create/edit form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerForm {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub telephone: String,
}

impl OwnerForm {
    /// Submitted field names, in display order.
    pub const FIELDS: [&'static str; 5] = ["firstName", "lastName", "address", "city", "telephone"];

    /// Value of a field by its submitted name. Unknown names yield `""`.
    pub fn value(&self, field: &str) -> &str {
        match field {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "address" => &self.address,
            "city" => &self.city,
            "telephone" => &self.telephone,
            _ => "",
        }
    }

    /// Apply every field rule and collect all failures.
    pub fn validate(&self) -> Result<OwnerFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        require_not_empty(&mut errors, "firstName", &self.first_name);
        require_not_empty(&mut errors, "lastName", &self.last_name);
        require_not_empty(&mut errors, "address", &self.address);
        require_not_empty(&mut errors, "city", &self.city);
        require_not_empty(&mut errors, "telephone", &self.telephone);
        require_digits(
            &mut errors,
            "telephone",
            &self.telephone,
            TELEPHONE_INTEGER_DIGITS,
            TELEPHONE_FRACTION_DIGITS,
        );

        errors.into_result()?;

        Ok(OwnerFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            telephone: self.telephone.clone(),
        })
    }
}

/// Descriptive owner fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerFields {
    first_name: String,
    last_name: String,
    address: String,
    city: String,
    telephone: String,
}

impl OwnerFields {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn telephone(&self) -> &str {
        &self.telephone
    }

    /// Attach a persistence-assigned identifier.
    pub fn into_owner(self, id: OwnerId) -> Owner {
        Owner {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            city: self.city,
            telephone: self.telephone,
        }
    }
}
