//! Data model for the crmdesk filter core: field descriptors, typed filter
//! values, the query codec, and the in-app location type. Everything here is
//! pure; the runtime lives in `crmdesk-filter-sync`.

pub mod codec;
pub mod fields;
pub mod location;
pub mod value;

pub use fields::FieldKind;
pub use fields::FilterFieldDescriptor;
pub use fields::NumberBounds;
pub use fields::OptionProvider;
pub use fields::OptionSource;
pub use fields::SelectOption;
pub use location::Location;
pub use value::DateRange;
pub use value::FilterPatch;
pub use value::FilterState;
pub use value::FilterValue;
