pub mod collection;
pub mod errors;
pub mod models;
pub mod modules;
pub mod store;
pub mod transform;

pub use collection::IssueCollection;
pub use errors::CollectionError;
pub use models::{fields, EnumKind, EnumTable, FieldValue, IssueRecord, UserRecord};
pub use modules::{ModuleGuesser, NoModuleGuess};
pub use transform::parse_issue_csv;
