pub mod value;
pub mod path;
pub mod validation;
pub mod serializer;
pub mod document;
pub mod options;
pub mod live;
pub mod store;
pub mod predicate;
pub mod error;

pub use error::{ErrorKind, PathDbError, Result};
pub use live::LiveObject;
pub use options::StoreOptions;
pub use path::IdPath;
pub use predicate::Predicate;
pub use store::{Filtered, Item, Store};
pub use value::{Map, Value};
