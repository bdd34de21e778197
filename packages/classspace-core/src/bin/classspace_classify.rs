//! Classpath classification CLI
//!
//! Prints the tier classification of a classpath as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Classify $CLASSPATH against the project's dependency graph
//! classspace-classify --project-dir . --graph target/test-classes/dependency-graph.dot
//!
//! # Explicit classpath, exclusions and a module folder
//! classspace-classify --graph deps.dot --classpath "$CP" \
//!     --exclusions 'org.acme*:*:*' --module acme-core=/core/
//!
//! # Debug logging of every tier entry
//! RUST_LOG=classspace_core=debug classspace-classify --graph deps.dot
//! ```

use clap::{Parser, ValueEnum};
use classspace_core::pipeline::{
    ClasspathProvider, EnvClasspathProvider, GraphFileDependenciesResolver,
    StaticClasspathProvider,
};
use classspace_core::{
    IsolationConfig, IsolationHarness, PluginSpace, ProvidedPrecedence, StaticModuleMapping,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "classspace-classify")]
#[command(about = "Partition a classpath into container, plugin and application tiers", long_about = None)]
struct Cli {
    /// Dependency graph file (defaults to the configured graph file)
    #[arg(short, long)]
    graph: Option<PathBuf>,

    /// Classpath as a platform path list (defaults to the configured environment variable)
    #[arg(short, long)]
    classpath: Option<OsString>,

    /// YAML isolation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project directory
    #[arg(short, long)]
    project_dir: Option<PathBuf>,

    /// Application exclusion patterns (group:name:type, comma separated)
    #[arg(short, long)]
    exclusions: Option<String>,

    /// Plugin tiers to build
    #[arg(long, value_enum)]
    plugin_space: Option<PluginSpaceArg>,

    /// Which tier wins entries reached as provided and from the application
    #[arg(long, value_enum)]
    precedence: Option<PrecedenceArg>,

    /// Module folder mapping, `artifact-name=/folder/` (repeatable)
    #[arg(short, long = "module")]
    modules: Vec<String>,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PluginSpaceArg {
    Disabled,
    AllCompile,
    Extensions,
}

#[derive(Clone, Copy, ValueEnum)]
enum PrecedenceArg {
    Container,
    Application,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let classpath_provider: Arc<dyn ClasspathProvider> = match &cli.classpath {
        Some(list) => Arc::new(StaticClasspathProvider::new(EnvClasspathProvider::split(
            list,
        ))),
        None => Arc::new(EnvClasspathProvider),
    };
    let dependencies_resolver = match &cli.graph {
        Some(path) => GraphFileDependenciesResolver::with_path(path),
        None => GraphFileDependenciesResolver::new(),
    };

    let harness = IsolationHarness::new(config)
        .with_classpath_provider(classpath_provider)
        .with_dependencies_resolver(Arc::new(dependencies_resolver))
        .with_module_mapping(Arc::new(parse_modules(&cli.modules)?));

    let classification = harness.classify()?;
    let json = if cli.compact {
        serde_json::to_string(&classification)?
    } else {
        serde_json::to_string_pretty(&classification)?
    };
    println!("{}", json);

    Ok(())
}

fn build_config(cli: &Cli) -> Result<IsolationConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => IsolationConfig::from_yaml(path)?,
        None => IsolationConfig::default(),
    };
    if let Some(dir) = &cli.project_dir {
        config = config.project_dir(dir);
    }
    if let Some(exclusions) = &cli.exclusions {
        config = config.app_exclusions(exclusions.clone());
    }
    if let Some(space) = cli.plugin_space {
        config = config.plugin_space(match space {
            PluginSpaceArg::Disabled => PluginSpace::Disabled,
            PluginSpaceArg::AllCompile => PluginSpace::AllCompile,
            PluginSpaceArg::Extensions => PluginSpace::Extensions,
        });
    }
    if let Some(precedence) = cli.precedence {
        config = config.provided_precedence(match precedence {
            PrecedenceArg::Container => ProvidedPrecedence::Container,
            PrecedenceArg::Application => ProvidedPrecedence::Application,
        });
    }
    Ok(config)
}

fn parse_modules(modules: &[String]) -> Result<StaticModuleMapping, Box<dyn std::error::Error>> {
    let mut mapping = StaticModuleMapping::new();
    for module in modules {
        let (name, folder) = module
            .split_once('=')
            .ok_or_else(|| format!("invalid --module '{}', expected name=/folder/", module))?;
        mapping = mapping.with(name.trim(), folder);
    }
    Ok(mapping)
}
