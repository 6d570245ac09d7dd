pub mod emitters;
pub mod generator;
pub mod merge;
pub mod naming;
pub mod recover;

pub use generator::{GenerateError, TsClientGenerator, TsGeneratorConfig};
pub use recover::recover_selection;
