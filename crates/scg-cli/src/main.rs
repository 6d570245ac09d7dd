use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use scg_core::adapter::{self, NormalizedSpec};
use scg_core::config::{self, Contract, ContractsConfig};
use scg_core::selection::{self, SelectedApis};
use scg_core::session::Session;
use scg_core::CodeGenerator;
use scg_typescript::generator::{APIS_FILE, TYPES_FILE};
use scg_typescript::{naming, recover_selection, TsClientGenerator, TsGeneratorConfig};

#[derive(Parser)]
#[command(name = "scg", about = "Swagger/OpenAPI typed-client generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the client modules from a spec document
    Generate {
        /// Path to the spec document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory; defaults to the configured workspace layout
        /// plus the document title
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Restrict generation to operations carrying one of these tags
        #[arg(short, long)]
        tag: Vec<String>,

        /// Override the document's own basePath
        #[arg(long)]
        base_path: Option<String>,

        /// Use the basePath override of this registered contract
        #[arg(long)]
        contract: Option<String>,
    },

    /// Validate that a spec document normalizes cleanly
    Validate {
        /// Path to the spec document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the normalized form of a spec document
    Inspect {
        /// Path to the spec document
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Manage the registry of source documents (.scg.yaml)
    Contract {
        #[command(subcommand)]
        command: ContractCommands,
    },

    /// Write a default .scg.yaml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ContractCommands {
    /// Register a document
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        base_path: Option<String>,
    },
    /// Remove a document by uid
    Remove {
        #[arg(long)]
        uid: String,
    },
    /// List registered documents
    List,
    /// Set the basePath override of a document
    SetBasePath {
        #[arg(long)]
        uid: String,
        #[arg(long)]
        base_path: String,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            tag,
            base_path,
            contract,
        } => cmd_generate(input, output, tag, base_path, contract),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Contract { command } => cmd_contract(command),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "scg", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Read and normalize a spec document (JSON, or YAML by extension).
fn load_spec(path: &Path) -> Result<NormalizedSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let doc: serde_json::Value = match ext {
        "yaml" | "yml" => serde_yaml_ng::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?,
    };

    adapter::normalize(&doc).map_err(Into::into)
}

fn cmd_generate(
    input: PathBuf,
    output: Option<PathBuf>,
    tags: Vec<String>,
    base_path: Option<String>,
    contract: Option<String>,
) -> Result<()> {
    let mut session = Session::new();
    let registry = config::load(Path::new("."), &mut session)?;

    let spec = load_spec(&input)?;

    let output_dir = output.unwrap_or_else(|| registry.doc_dir(spec.info.title_or_default()));

    let base_path_override = base_path.or_else(|| {
        contract
            .as_deref()
            .and_then(|name| registry.find(name))
            .and_then(|c| c.base_path.clone())
    });

    let selected = selection::select_all(&spec, &tags);

    // Merge with what a previous pass generated so its selection survives.
    let previous_apis = read_if_exists(&output_dir.join(APIS_FILE));
    let previous_types = read_if_exists(&output_dir.join(TYPES_FILE));
    let recovered: SelectedApis = previous_apis
        .as_deref()
        .map(recover_selection)
        .unwrap_or_default();
    let merged = selection::merge_selection(recovered, selected);

    let generator = TsClientGenerator::default();
    let gen_config = TsGeneratorConfig {
        base_path_override,
        previous_types,
        previous_apis,
        ..TsGeneratorConfig::default()
    };

    // Fails before anything is written when the selection is empty.
    let files = generator.generate(&spec, &merged, &gen_config)?;

    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    for file in &files {
        let path = output_dir.join(&file.path);
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }

    eprintln!("Generated {} files in {}", files.len(), output_dir.display());
    Ok(())
}

fn read_if_exists(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let spec = load_spec(&input)?;

    eprintln!(
        "Valid {} spec: {}",
        spec.version,
        spec.info.title_or_default()
    );
    eprintln!("  Paths: {}", spec.paths.len());
    eprintln!("  Definitions: {}", spec.definitions.len());
    eprintln!("  Tags: {}", spec.tags.len());
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let spec = load_spec(&input)?;
    let summary = build_inspect_summary(&spec);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    Ok(())
}

fn build_inspect_summary(spec: &NormalizedSpec) -> serde_json::Value {
    let operations: Vec<serde_json::Value> = spec
        .paths
        .iter()
        .flat_map(|(path, methods)| {
            methods.iter().map(move |(method, op)| {
                let operation_id = op.operation_id.clone().unwrap_or_default();
                serde_json::json!({
                    "name": naming::method_name(&operation_id, path, method),
                    "method": method,
                    "path": path,
                    "tags": op.tags,
                })
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": spec.info.title_or_default(),
            "version": spec.info.version,
        },
        "basePath": spec.base_path,
        "definitions": spec.definitions.keys().collect::<Vec<_>>(),
        "tags": spec.tags.iter().map(|t| &t.name).collect::<Vec<_>>(),
        "operations": operations,
    })
}

fn cmd_contract(command: ContractCommands) -> Result<()> {
    let dir = Path::new(".");
    let mut session = Session::new();
    let mut registry = config::load(dir, &mut session)?;

    match command {
        ContractCommands::Add {
            name,
            url,
            description,
            base_path,
        } => {
            // A stable id derived from the url keeps re-adds idempotent to
            // reason about without carrying an id-generation dependency.
            let uid = naming::path_hash(&url);
            registry.add(Contract {
                name: name.clone(),
                url,
                description,
                base_path,
                uid: uid.clone(),
            })?;
            config::save(dir, &registry)?;
            eprintln!("Registered {name} (uid {uid})");
        }
        ContractCommands::Remove { uid } => {
            if registry.remove(&uid) {
                config::save(dir, &registry)?;
                eprintln!("Removed {uid}");
            } else {
                eprintln!("No contract with uid {uid}");
            }
        }
        ContractCommands::List => {
            for c in &registry.contracts {
                let base = c.base_path.as_deref().unwrap_or("-");
                println!("{}\t{}\t{}\t{}", c.uid, c.name, c.url, base);
            }
        }
        ContractCommands::SetBasePath { uid, base_path } => {
            registry.set_base_path(&uid, base_path)?;
            config::save(dir, &registry)?;
            eprintln!("Updated {uid}");
        }
    }

    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
    }

    config::save(Path::new("."), &ContractsConfig::default())?;
    eprintln!("Created {}", path.display());
    Ok(())
}
