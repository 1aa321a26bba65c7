//! Dunning Templates - reusable message skeletons and placeholder rendering.
//!
//! A [`Template`] carries a body (and, for email, a subject) containing
//! `{{name}}` placeholders. [`render_template`] substitutes values for those
//! placeholders in a single pass; [`available_variables`] lists the names an
//! editor can offer for insertion.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use dunning_templates::render_template;
//!
//! let vars = HashMap::from([
//!     ("borrower_name".to_string(), "Jane".to_string()),
//!     ("amount_due".to_string(), "$50".to_string()),
//! ]);
//! let text = render_template("Hi {{borrower_name}}, you owe {{amount_due}}", &vars);
//! assert_eq!(text, "Hi Jane, you owe $50");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod model;
pub mod render;
pub mod store;
pub mod variables;

pub use error::{Result, TemplateError};
pub use model::{RenderedMessage, Template, STANDARD_VARIABLES};
pub use render::{placeholders, render_message, render_template, undeclared_placeholders};
pub use store::{TemplateLookup, TemplateStore};
pub use variables::{available_variables, available_variables_for, search_variables};
