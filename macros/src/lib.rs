mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a documentation function for the route, named after the handler with the suffix `_docs`.
///
/// The first line of the handler's doc comment becomes the summary and the remaining
/// lines become the description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates the `CreateX` input struct for the model, with `#[model(create)]`.
///
/// Fields with `#[serde(skip_deserializing)]` or `#[serde(skip)]` are left out,
/// all other fields are copied verbatim (including attributes).
#[proc_macro_attribute]
pub fn model(args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(args, input)
}
