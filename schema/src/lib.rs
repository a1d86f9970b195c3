//! Data model for YAIF documents.
//!
//! A `.yaif` file is parsed into a [`Document`] whose type references are
//! still bare names. Resolution turns it into a [`SchemaModel`]: every
//! reference is tagged as an interface or enum, configuration defaults are
//! applied and each interface carries both its own and its flattened fields.
//!
//! ```
//! use yaif_schema::*;
//!
//! let ty = TypeExpr::list(TypeExpr::optional(TypeExpr::primitive(Primitive::Int)));
//! assert_eq!(ty.to_string(), "list[optional[int]]");
//! ```

pub mod config;
pub mod model;
pub mod types;

pub use config::*;
pub use model::*;
pub use types::*;

/// Keywords of the type grammar. They cannot be used as definition names.
pub const RESERVED_NAMES: [&str; 7] = [
    "string", "int", "float", "bool", "list", "dict", "optional",
];
