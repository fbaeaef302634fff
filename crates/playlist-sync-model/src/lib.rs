pub mod document;
pub mod profile;
pub mod builtin;
pub mod selection;
pub mod report;

pub use document::*;
pub use profile::*;
pub use selection::*;
pub use report::*;
