use std::collections::BTreeSet;

use thiserror::Error;

use scg_core::adapter::NormalizedSpec;
use scg_core::generic::{Delimiters, WrapperCatalog};
use scg_core::graph::{build_api_pool, build_types_pool, collect_required_types};
use scg_core::selection::{SelectedApis, filter_paths, picked_keys};
use scg_core::{CodeGenerator, GeneratedFile};

use crate::emitters::{self, RenderContext};
use crate::merge;

pub const TYPES_FILE: &str = "types.ts";
pub const APIS_FILE: &str = "apis.ts";
pub const INDEX_FILE: &str = "index.ts";

#[derive(Debug, Error)]
pub enum GenerateError {
    /// Nothing survived selection filtering; no file must be written.
    #[error("no operations selected")]
    NothingSelected,
}

/// Options for one generation pass.
#[derive(Debug, Default)]
pub struct TsGeneratorConfig {
    /// Overrides the document's own basePath (user-supplied, from the
    /// contract registry).
    pub base_path_override: Option<String>,
    /// Delimiter glyphs of the pseudo-generic name notation.
    pub delimiters: Delimiters,
    /// Content of the previously generated artifacts, for incremental
    /// merging. `None` renders from scratch.
    pub previous_types: Option<String>,
    pub previous_apis: Option<String>,
}

/// TypeScript client generator.
#[derive(Default)]
pub struct TsClientGenerator {
    pub catalog: WrapperCatalog,
}

impl CodeGenerator for TsClientGenerator {
    type Config = TsGeneratorConfig;
    type Error = GenerateError;

    fn generate(
        &self,
        spec: &NormalizedSpec,
        selection: &SelectedApis,
        config: &TsGeneratorConfig,
    ) -> Result<Vec<GeneratedFile>, GenerateError> {
        let picked = picked_keys(selection);
        let filtered = filter_paths(&spec.paths, &picked);
        if filtered.is_empty() {
            return Err(GenerateError::NothingSelected);
        }

        let types_pool = build_types_pool(&spec.definitions, config.delimiters);
        let api_pool = build_api_pool(&filtered, config.delimiters, &self.catalog);
        let required =
            collect_required_types(&api_pool, &types_pool, config.delimiters, &self.catalog);
        let generic_keys: BTreeSet<String> = types_pool
            .values()
            .filter(|t| t.is_generic)
            .map(|t| t.key.clone())
            .collect();

        let base_path_raw = config
            .base_path_override
            .as_deref()
            .unwrap_or(&spec.base_path);
        let base_path = if base_path_raw == "/" { "" } else { base_path_raw };

        log::debug!(
            "rendering {} operations, {} required types ({} generic)",
            api_pool.len(),
            required.len(),
            generic_keys.len()
        );

        let ctx = RenderContext {
            spec,
            selection,
            types_pool: &types_pool,
            api_pool: &api_pool,
            required: &required,
            generic_keys: &generic_keys,
            delimiters: config.delimiters,
            catalog: &self.catalog,
            base_path,
        };

        let mut types_out = emitters::types::emit_types(&ctx);
        if let Some(prev) = &config.previous_types {
            types_out = merge::merge(prev, &types_out);
        }

        let mut apis_out = emitters::apis::emit_apis(&ctx);
        if let Some(prev) = &config.previous_apis {
            apis_out = merge::merge(prev, &apis_out);
        }

        Ok(vec![
            GeneratedFile {
                path: TYPES_FILE.to_string(),
                content: types_out,
            },
            GeneratedFile {
                path: APIS_FILE.to_string(),
                content: apis_out,
            },
            GeneratedFile {
                path: INDEX_FILE.to_string(),
                content: emitters::index::emit_index(),
            },
        ])
    }
}
