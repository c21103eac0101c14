pub mod call;
pub mod category;
pub mod component;
pub mod diagnostics;
pub mod error;
pub mod file_copy;
pub mod guest;
pub mod hivex;
pub mod nbdkit;
pub mod options;
pub mod run;
pub mod stage;

pub use call::*;
pub use category::*;
pub use component::*;
pub use diagnostics::*;
pub use error::{Error, Result};
pub use file_copy::*;
pub use guest::*;
pub use hivex::*;
pub use nbdkit::*;
pub use options::*;
pub use run::*;
pub use stage::*;
