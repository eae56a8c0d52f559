//! Typed field descriptors for the signup steps.

use serde::Serialize;
use validator::ValidateEmail;

/// Input kinds a signup field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Email,
    Tel,
    Text,
    PostalCode,
}

/// A single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Key the value is submitted under.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Copy key for the field label.
    pub label_key: &'static str,
    pub required: bool,
    /// Browser autocomplete hint.
    pub autocomplete: &'static str,
}

/// Why a submitted value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Field '{0}' is required")]
    Required(&'static str),

    #[error("Field '{0}' must be a valid email address")]
    InvalidEmail(&'static str),

    #[error("Field '{0}' must be a valid phone number")]
    InvalidPhone(&'static str),

    #[error("Field '{0}' must be a 5-digit postal code")]
    InvalidPostalCode(&'static str),

    #[error("Field '{0}' is not part of this step")]
    UnexpectedField(String),
}

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

impl FieldDescriptor {
    /// Check a submitted value. Blank optional fields always pass.
    pub fn validate(&self, value: Option<&str>) -> Result<(), FieldError> {
        let value = value.map(str::trim).unwrap_or_default();

        if value.is_empty() {
            return if self.required {
                Err(FieldError::Required(self.name))
            } else {
                Ok(())
            };
        }

        match self.kind {
            FieldKind::Email if !value.validate_email() => Err(FieldError::InvalidEmail(self.name)),
            FieldKind::Tel if !is_phone_number(value) => Err(FieldError::InvalidPhone(self.name)),
            FieldKind::PostalCode if !is_postal_code(value) => {
                Err(FieldError::InvalidPostalCode(self.name))
            }
            _ => Ok(()),
        }
    }
}

fn is_phone_number(value: &str) -> bool {
    let mut digits = 0;
    for (i, ch) in value.chars().enumerate() {
        match ch {
            '0'..='9' => digits += 1,
            '+' if i == 0 => {}
            ' ' | '-' | '.' | '(' | ')' => {}
            _ => return false,
        }
    }
    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
}

fn is_postal_code(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Step 1 fields: how to reach the supporter.
pub fn contact_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor {
            name: "email",
            kind: FieldKind::Email,
            label_key: "signupPage.emailLabel",
            required: true,
            autocomplete: "email",
        },
        FieldDescriptor {
            name: "phone",
            kind: FieldKind::Tel,
            label_key: "signupPage.phoneLabel",
            required: false,
            autocomplete: "tel",
        },
        FieldDescriptor {
            name: "zip",
            kind: FieldKind::PostalCode,
            label_key: "signupPage.zipLabel",
            required: true,
            autocomplete: "postal-code",
        },
    ]
}

/// Step 2 fields: who the supporter is.
pub fn identity_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor {
            name: "firstName",
            kind: FieldKind::Text,
            label_key: "signupPage.firstNameLabel",
            required: true,
            autocomplete: "given-name",
        },
        FieldDescriptor {
            name: "lastName",
            kind: FieldKind::Text,
            label_key: "signupPage.lastNameLabel",
            required: true,
            autocomplete: "family-name",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind, required: bool) -> FieldDescriptor {
        FieldDescriptor {
            name: "f",
            kind,
            label_key: "label",
            required,
            autocomplete: "off",
        }
    }

    #[test]
    fn required_field_rejects_missing_and_blank() {
        let f = field(FieldKind::Text, true);
        assert_eq!(f.validate(None), Err(FieldError::Required("f")));
        assert_eq!(f.validate(Some("   ")), Err(FieldError::Required("f")));
        assert_eq!(f.validate(Some("Ed")), Ok(()));
    }

    #[test]
    fn optional_field_accepts_blank() {
        assert_eq!(field(FieldKind::Tel, false).validate(Some("")), Ok(()));
        assert_eq!(field(FieldKind::Tel, false).validate(None), Ok(()));
    }

    #[test]
    fn email_format_is_checked() {
        let f = field(FieldKind::Email, true);
        assert_eq!(f.validate(Some("ed@edmarkey.com")), Ok(()));
        assert_eq!(f.validate(Some("not-an-email")), Err(FieldError::InvalidEmail("f")));
    }

    #[test]
    fn phone_accepts_punctuation() {
        let f = field(FieldKind::Tel, false);
        assert_eq!(f.validate(Some("(617) 555-0100")), Ok(()));
        assert_eq!(f.validate(Some("+1 617 555 0100")), Ok(()));
        assert_eq!(f.validate(Some("555-0100")), Err(FieldError::InvalidPhone("f")));
        assert_eq!(f.validate(Some("617x5550100")), Err(FieldError::InvalidPhone("f")));
    }

    #[test]
    fn postal_code_is_five_digits() {
        let f = field(FieldKind::PostalCode, true);
        assert_eq!(f.validate(Some("00000")), Ok(()));
        assert_eq!(f.validate(Some("0000")), Err(FieldError::InvalidPostalCode("f")));
        assert_eq!(f.validate(Some("0210a")), Err(FieldError::InvalidPostalCode("f")));
    }

    #[test]
    fn builders_use_distinct_names() {
        let mut names: Vec<_> = contact_fields()
            .into_iter()
            .chain(identity_fields())
            .map(|f| f.name)
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
