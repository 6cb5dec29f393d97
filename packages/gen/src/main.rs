use std::path::PathBuf;

use clap::Parser;

use bundlefs_gen::{Bundler, Generator, GeneratorConfig, OsFileSystem};

/// bfsgen - embed a directory tree as a bundlefs bundle
#[derive(Parser, Debug)]
#[command(name = "bfsgen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory whose contents will be embedded
    #[arg(short, long, default_value = "resources")]
    dir: PathBuf,

    /// Module identifier for the generated source
    #[arg(short, long)]
    package: String,

    /// Bundle name; defaults to the resource directory's file name
    #[arg(short = 'n', long)]
    bundle: Option<String>,

    /// Directory the generated source file is written into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Include documentation comments in the generated source
    #[arg(long)]
    include_docs: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), bundlefs_gen::Error> {
    let name = match &args.bundle {
        Some(name) => name.clone(),
        None => args
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resources".to_string()),
    };

    let fs = OsFileSystem;
    let bundle = Bundler::new(&fs).bundle(&args.dir, &name)?;

    let generator = Generator {
        fs: &fs,
        config: GeneratorConfig {
            package: args.package,
            output: args.output.clone(),
            include_docs: args.include_docs,
        },
    };
    generator.compose(&bundle)?;

    println!("wrote {}", args.output.join(format!("{}.rs", name)).display());
    Ok(())
}
