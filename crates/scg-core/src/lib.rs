pub mod adapter;
pub mod config;
pub mod error;
pub mod generic;
pub mod graph;
pub mod selection;
pub mod session;

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce client artifacts from a normalized
/// spec and a set of selected operations.
pub trait CodeGenerator {
    type Config;
    type Error: std::error::Error;
    fn generate(
        &self,
        spec: &adapter::NormalizedSpec,
        selection: &selection::SelectedApis,
        config: &Self::Config,
    ) -> Result<Vec<GeneratedFile>, Self::Error>;
}
