// Entity Models
//
// - DataType: named category, unique name (Type Catalog)
// - DataEntry: dated numeric value tagged with a DataType name (Entry Store)

pub mod data_type;
pub mod data_entry;

pub use data_type::{DataType, DataTypeInput};
pub use data_entry::{DataEntry, DataEntryInput, EntryFilter};
