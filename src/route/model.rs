use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: Uuid,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct EmailInput {
	#[validate(email(message = "email must be a valid address"))]
	pub email: String,
}

/// An empty JSON object, returned when there is nothing else to say.
#[derive(Debug, Default, Serialize, JsonSchema)]
pub struct Empty {}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::{EmailInput, Empty};

	#[test]
	fn test_empty_is_an_object() {
		assert_eq!(serde_json::to_string(&Empty::default()).unwrap(), "{}");
	}

	#[test]
	fn test_email_input() {
		let valid = EmailInput {
			email: "a@x.com".into(),
		};
		let invalid = EmailInput {
			email: "not an email".into(),
		};

		assert!(valid.validate().is_ok());
		assert!(invalid.validate().is_err());
	}
}
