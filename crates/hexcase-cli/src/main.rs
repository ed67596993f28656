//! hexcase CLI - generate honeycomb-vented enclosure halves
//!
//! Loads a TOML configuration, assembles a case half and writes its CSG
//! document as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hexcase::{assemble, assemble_variant, CaseConfig, CaseVariant, Part, PrimitiveCounts};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexcase")]
#[command(about = "Parametric honeycomb-vented enclosure generator", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble one case half and write its document
    Generate {
        /// TOML configuration (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Half to build, overriding the is_top/is_bottom flags
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,
        /// Output .json file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Assemble both halves from one configuration
    Both {
        /// TOML configuration (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory receiving case_top.json and case_bottom.json
        #[arg(long)]
        out_dir: PathBuf,
    },
    /// Display information about a generated document
    Info {
        /// Path to the .json document
        file: PathBuf,
    },
    /// Print the default configuration as TOML
    Defaults,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Top,
    Bottom,
    Combined,
}

impl From<VariantArg> for CaseVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Top => CaseVariant::Top,
            VariantArg::Bottom => CaseVariant::Bottom,
            VariantArg::Combined => CaseVariant::Combined,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            variant,
            output,
        } => generate(config.as_deref(), variant, output.as_deref()),
        Commands::Both { config, out_dir } => generate_both(config.as_deref(), &out_dir),
        Commands::Info { file } => show_info(&file),
        Commands::Defaults => {
            print!("{}", CaseConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CaseConfig> {
    match path {
        Some(path) => CaseConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CaseConfig::default()),
    }
}

fn generate(
    config: Option<&Path>,
    variant: Option<VariantArg>,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(config)?;
    let part = match variant {
        Some(variant) => assemble_variant(&config, variant.into())?,
        None => assemble(&config)?,
    };
    let json = part.to_document(part.name.clone()).to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(part = %part.name, path = %path.display(), "wrote document");
            println!(
                "Wrote {} ({} nodes) to {}",
                part.name,
                part.node_count(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn generate_both(config: Option<&Path>, out_dir: &Path) -> Result<()> {
    let config = load_config(config)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for variant in [CaseVariant::Top, CaseVariant::Bottom] {
        let part = assemble_variant(&config, variant)?;
        let path = out_dir.join(format!("{}.json", variant.label()));
        std::fs::write(&path, part.to_document(variant.label()).to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!(
            "Wrote {} ({} nodes) to {}",
            variant.label(),
            part.node_count(),
            path.display()
        );
    }
    Ok(())
}

fn show_info(file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let doc = hexcase_ir::Document::from_json(&json)?;

    println!("hexcase document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Nodes: {}", doc.nodes.len());
    println!("  Scene entries: {}", doc.roots.len());

    let dangling = doc.dangling_references();
    if !dangling.is_empty() {
        anyhow::bail!("document references missing nodes: {:?}", dangling);
    }

    for (i, entry) in doc.roots.iter().enumerate() {
        let part = Part::from_document(&doc, entry)
            .ok_or_else(|| anyhow::anyhow!("root {} not found", entry.root))?;
        let counts = PrimitiveCounts::of(&part);
        println!("\n  {}: {}", i + 1, entry.label);
        println!("    Nodes: {}", part.node_count());
        println!(
            "    Primitives: {} ({} hex, {} round, {} box, {} rounded box; {} cut)",
            counts.total(),
            counts.hex_prisms,
            counts.cylinders,
            counts.cubes,
            counts.rounded_cubes,
            counts.subtractive
        );
        match hexcase::bounds(&part) {
            Some(b) => {
                let size = b.size();
                println!(
                    "    Bounds: {:.2} x {:.2} x {:.2} (z {:.2}..{:.2})",
                    size.x, size.y, size.z, b.min.z, b.max.z
                );
            }
            None => println!("    Bounds: empty"),
        }
    }

    Ok(())
}
