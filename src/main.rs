use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docu_core::analyzer::index::{find_python_files, IndexOptions, ProjectIndex};
use docu_core::analyzer::locate::{read_module, Locator, Resolution};
use docu_core::cache::IncrementalCache;
use docu_core::docgen::{fill_file, template_for};
use docu_core::parser::parse_bytes;
use docu_core::render::html::{render_html, HtmlOptions, STYLESHEET, STYLESHEET_NAME};
use docu_core::render::text::render_text;
use docu_core::{ModuleSymbolTree, Result};

#[derive(Parser)]
#[command(author, version, about = "Documentation generator for python sources", long_about = None)]
struct Cli {
    /// Extra directory searched for dotted module names (repeatable)
    #[arg(long = "path", global = true)]
    paths: Vec<PathBuf>,

    /// Also document python files in subdirectories
    #[arg(long, global = true)]
    recursive: bool,

    /// Keep parsed symbol trees here between runs
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the text report of a module
    Show { name: String },
    /// Write `<module>.txt`
    Text(OutputArgs),
    /// Write `<module>.html` and the stylesheet
    Html(OutputArgs),
    /// Print the symbol tree as JSON (reads STDIN when no name is given)
    Parse(ParseArgs),
    /// Print a docstring template for one function
    Template { name: String, function: String },
    /// Insert docstring templates for undocumented functions, in place
    Fill { name: String },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// File, package, directory or dotted module name
    name: String,

    /// Output directory
    #[arg(short = 'd', long, default_value = ".")]
    dir: PathBuf,

    /// Output file, for a single module
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct ParseArgs {
    name: Option<String>,

    /// Name to document the module under
    #[arg(long)]
    module_name: Option<String>,
}

/// What a name resolved to, already parsed.
enum Documented {
    Module(ModuleSymbolTree),
    Batch(Vec<ModuleSymbolTree>),
}

impl Documented {
    fn into_trees(self) -> Vec<ModuleSymbolTree> {
        match self {
            Documented::Module(tree) => vec![tree],
            Documented::Batch(trees) => trees,
        }
    }
}

struct App {
    locator: Locator,
    index_options: IndexOptions,
    cache: Option<IncrementalCache<ModuleSymbolTree>>,
}

impl App {
    fn new(cli: &Cli) -> Self {
        Self {
            locator: Locator::from_env(cli.paths.clone()),
            index_options: IndexOptions {
                recursive: cli.recursive,
            },
            cache: cli
                .cache_dir
                .as_ref()
                .map(|dir| IncrementalCache::new(dir, env!("CARGO_PKG_VERSION"))),
        }
    }

    fn index(&self, dir: &Path) -> ProjectIndex {
        ProjectIndex::index_directory(dir, &self.index_options, self.cache.as_ref())
    }

    fn document(&self, name: &str) -> Result<Documented> {
        match self.locator.resolve(name)? {
            Resolution::Module(source) => Ok(Documented::Module(read_module(&source)?)),
            Resolution::Directory(dir) => {
                let index = self.index(&dir);
                if index.is_empty() {
                    warn!(dir = %dir.display(), "no python files to document");
                }
                Ok(Documented::Batch(
                    index.trees().into_iter().map(|(_, tree)| tree).collect(),
                ))
            }
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docu=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("docu: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let app = App::new(&cli);
    match cli.command {
        Commands::Show { name } => {
            let reports: Vec<String> = app
                .document(&name)?
                .into_trees()
                .iter()
                .map(render_text)
                .collect();
            print!("{}", reports.join("\n"));
            Ok(())
        }
        Commands::Text(args) => {
            let documented = app.document(&args.name)?;
            for (tree, path) in output_targets(documented, &args, "txt") {
                write_output(&path, &render_text(&tree))?;
            }
            Ok(())
        }
        Commands::Html(args) => {
            let trees = app.document(&args.name)?;
            let targets = output_targets(trees, &args, "html");
            let batch: BTreeSet<String> = targets
                .iter()
                .map(|(tree, _)| tree.module_name.clone())
                .collect();
            for (tree, path) in &targets {
                let out_dir = parent_dir(path);
                let linked_modules = tree
                    .imports
                    .iter()
                    .filter(|module| {
                        batch.contains(*module) || out_dir.join(format!("{module}.html")).is_file()
                    })
                    .cloned()
                    .collect();
                let page = render_html(tree, &HtmlOptions { linked_modules });
                write_output(path, &page)?;
                write_stylesheet(&out_dir)?;
            }
            Ok(())
        }
        Commands::Parse(args) => {
            let json = match args.name {
                None => {
                    let mut bytes = Vec::new();
                    io::stdin().read_to_end(&mut bytes)?;
                    let module_name = args.module_name.as_deref().unwrap_or("stdin");
                    serde_json::to_string_pretty(&parse_bytes(module_name, &bytes)?)?
                }
                Some(name) => match app.locator.resolve(&name)? {
                    Resolution::Module(mut source) => {
                        if let Some(module_name) = args.module_name {
                            source.module_name = module_name;
                        }
                        serde_json::to_string_pretty(&read_module(&source)?)?
                    }
                    Resolution::Directory(dir) => app.index(&dir).to_json()?,
                },
            };
            println!("{json}");
            Ok(())
        }
        Commands::Template { name, function } => {
            let tree = app.locator.load(&name)?;
            if let Some(template) = template_for(&tree, &function)? {
                println!("{template}");
            }
            Ok(())
        }
        Commands::Fill { name } => {
            let files = match app.locator.resolve(&name)? {
                Resolution::Module(source) => vec![source.path],
                Resolution::Directory(dir) => find_python_files(&dir, cli.recursive),
            };
            for path in files {
                fill_file(&path)?;
            }
            Ok(())
        }
    }
}

/// Pair every tree with the file it is written to.
fn output_targets(
    documented: Documented,
    args: &OutputArgs,
    extension: &str,
) -> Vec<(ModuleSymbolTree, PathBuf)> {
    match documented {
        Documented::Module(tree) => {
            let path = args
                .output
                .clone()
                .unwrap_or_else(|| args.dir.join(format!("{}.{extension}", tree.module_name)));
            vec![(tree, path)]
        }
        Documented::Batch(trees) => {
            if args.output.is_some() {
                warn!("--output ignored when documenting a directory");
            }
            trees
                .into_iter()
                .map(|tree| {
                    let path = args.dir.join(format!("{}.{extension}", tree.module_name));
                    (tree, path)
                })
                .collect()
        }
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::create_dir_all(parent_dir(path))?;
    fs::write(path, content)?;
    info!(path = %path.display(), "wrote documentation");
    Ok(())
}

fn write_stylesheet(dir: &Path) -> Result<()> {
    let css = dir.join(STYLESHEET_NAME);
    if !css.exists() {
        fs::write(&css, STYLESHEET)?;
        info!(path = %css.display(), "wrote stylesheet");
    }
    Ok(())
}
