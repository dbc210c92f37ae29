use aide::{openapi::Tag, transform::TransformOpenApi};

use crate::{error, extract::Json};

pub mod tag {
	pub const USER: &str = "User";
	pub const POST: &str = "Post";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Flatfile API")
		.summary("Users and posts stored in a single JSON file")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::USER.into(),
			description: Some("User management".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Post management".into()),
			..Default::default()
		})
		.default_response_with::<Json<error::ErrorResponse>, _>(|res| {
			res.example(error::ErrorResponse {
				error: "user a@x.com doesn't exist".into(),
			})
		})
}
