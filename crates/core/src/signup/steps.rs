//! Step definitions for the signup form.
//!
//! Steps are built by pure functions and validated at construction, so a
//! [`StepDefinition`] in hand always has a usable field set.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::CoreError;
use crate::page::ResolvedPageView;
use crate::signup::fields::{contact_fields, identity_fields, FieldDescriptor, FieldError};
use crate::types::FormValues;

/// Copy key for the step 1 button.
pub const STEP_ONE_BUTTON_KEY: &str = "signupPage.stepOneButtonLabel";
/// Copy key for the step 2 button.
pub const STEP_TWO_BUTTON_KEY: &str = "signupPage.stepTwoButtonLabel";

/// One screen of the signup form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    title: String,
    subtitle: String,
    button_copy_key: &'static str,
    fields: Vec<FieldDescriptor>,
    show_sms_disclaimer: bool,
}

impl StepDefinition {
    /// Build a step, rejecting empty field sets and duplicate field names.
    pub fn new(
        title: impl Into<String>,
        subtitle: impl Into<String>,
        button_copy_key: &'static str,
        fields: Vec<FieldDescriptor>,
        show_sms_disclaimer: bool,
    ) -> Result<Self, CoreError> {
        if fields.is_empty() {
            return Err(CoreError::Validation(
                "A signup step needs at least one field".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.is_empty() {
                return Err(CoreError::Validation("Field name must not be empty".to_string()));
            }
            if !seen.insert(field.name) {
                return Err(CoreError::Validation(format!(
                    "Duplicate field '{}' in step",
                    field.name
                )));
            }
        }

        Ok(Self {
            title: title.into(),
            subtitle: subtitle.into(),
            button_copy_key,
            fields,
            show_sms_disclaimer,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    pub fn button_copy_key(&self) -> &'static str {
        self.button_copy_key
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn show_sms_disclaimer(&self) -> bool {
        self.show_sms_disclaimer
    }

    /// Validate submitted values against this step's fields.
    ///
    /// Returns every failing field in field order, then every submitted key
    /// the step does not own.
    pub fn validate_values(&self, values: &FormValues) -> Result<(), Vec<FieldError>> {
        let mut errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|f| f.validate(values.get(f.name).map(String::as_str)).err())
            .collect();

        errors.extend(
            values
                .keys()
                .filter(|key| !self.fields.iter().any(|f| f.name == key.as_str()))
                .map(|key| FieldError::UnexpectedField(key.clone())),
        );

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Reject step sequences whose fields would overwrite each other when the
/// per-step values are merged.
pub fn validate_step_sequence(steps: &[StepDefinition]) -> Result<(), CoreError> {
    if steps.is_empty() {
        return Err(CoreError::Validation(
            "A signup form needs at least one step".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in steps.iter().flat_map(|s| s.fields.iter()) {
        if !seen.insert(field.name) {
            return Err(CoreError::Validation(format!(
                "Field '{}' appears in more than one step",
                field.name
            )));
        }
    }
    Ok(())
}

/// The two signup steps for `page`: contact details, then identity.
pub fn signup_steps(page: &ResolvedPageView) -> Result<Vec<StepDefinition>, CoreError> {
    let steps = vec![
        StepDefinition::new(
            &page.title,
            &page.subtitle,
            STEP_ONE_BUTTON_KEY,
            contact_fields(),
            true,
        )?,
        StepDefinition::new(
            &page.title,
            &page.subtitle,
            STEP_TWO_BUTTON_KEY,
            identity_fields(),
            false,
        )?,
    ];
    validate_step_sequence(&steps)?;
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::signup::fields::FieldKind;

    fn page() -> ResolvedPageView {
        ResolvedPageView {
            code: "ed".into(),
            title: "Help Ed".into(),
            subtitle: "Join now".into(),
            background: "bg1".into(),
            created_by_first_name: "Ed".into(),
        }
    }

    fn text_field(name: &'static str) -> FieldDescriptor {
        FieldDescriptor {
            name,
            kind: FieldKind::Text,
            label_key: "label",
            required: true,
            autocomplete: "off",
        }
    }

    #[test]
    fn signup_steps_are_contact_then_identity() {
        let steps = signup_steps(&page()).unwrap();
        assert_eq!(steps.len(), 2);

        assert_eq!(steps[0].title(), "Help Ed");
        assert_eq!(steps[0].button_copy_key(), STEP_ONE_BUTTON_KEY);
        assert!(steps[0].show_sms_disclaimer());
        assert!(steps[0].fields().iter().any(|f| f.name == "email"));

        assert_eq!(steps[1].subtitle(), "Join now");
        assert_eq!(steps[1].button_copy_key(), STEP_TWO_BUTTON_KEY);
        assert!(!steps[1].show_sms_disclaimer());
        assert!(steps[1].fields().iter().any(|f| f.name == "firstName"));
    }

    #[test]
    fn empty_step_is_rejected() {
        assert_matches!(
            StepDefinition::new("t", "s", STEP_ONE_BUTTON_KEY, vec![], false),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn duplicate_field_in_step_is_rejected() {
        let fields = vec![text_field("name"), text_field("name")];
        assert_matches!(
            StepDefinition::new("t", "s", STEP_ONE_BUTTON_KEY, fields, false),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn duplicate_field_across_steps_is_rejected() {
        let a = StepDefinition::new("t", "s", STEP_ONE_BUTTON_KEY, vec![text_field("x")], false)
            .unwrap();
        let b = StepDefinition::new("t", "s", STEP_TWO_BUTTON_KEY, vec![text_field("x")], false)
            .unwrap();
        assert_matches!(validate_step_sequence(&[a, b]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert_matches!(validate_step_sequence(&[]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn validate_values_reports_each_failure() {
        let steps = signup_steps(&page()).unwrap();
        let mut values = FormValues::new();
        values.insert("email".into(), "nope".into());

        let errors = steps[0].validate_values(&values).unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::InvalidEmail("email"), FieldError::Required("zip")]
        );

        values.insert("email".into(), "ed@edmarkey.com".into());
        values.insert("zip".into(), "00000".into());
        assert_eq!(steps[0].validate_values(&values), Ok(()));
    }

    #[test]
    fn keys_outside_the_step_are_rejected() {
        let steps = signup_steps(&page()).unwrap();
        let values: FormValues = [
            ("firstName", "Ed"),
            ("lastName", "Markey"),
            ("email", "not-an-email"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(
            steps[1].validate_values(&values),
            Err(vec![FieldError::UnexpectedField("email".into())])
        );
    }
}
