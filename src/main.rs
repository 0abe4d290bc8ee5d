use anyhow::Result;
use clap::{App, load_yaml};
use env_logger::Builder;
use jemallocator::Jemalloc;
use log::{debug, info};
use ipscout::args;
use ipscout::config::{self, File};
use ipscout::start::start;

#[global_allocator]
static ALLOC: Jemalloc = Jemalloc;

const BANNER: &str = r#"
██╗██████╗ ███████╗ ██████╗ ██████╗ ██╗   ██╗████████╗
██║██╔══██╗██╔════╝██╔════╝██╔═══██╗██║   ██║╚══██╔══╝
██║██████╔╝███████╗██║     ██║   ██║██║   ██║   ██║
██║██╔═══╝ ╚════██║██║     ██║   ██║██║   ██║   ██║
██║██║     ███████║╚██████╗╚██████╔╝╚██████╔╝   ██║
╚═╝╚═╝     ╚══════╝ ╚═════╝ ╚═════╝  ╚═════╝    ╚═╝"#;

fn main() -> Result<()> {
    let yaml = load_yaml!("args.yml");
    let ver  = env!("CARGO_PKG_VERSION");
    let args = App::from_yaml(&yaml).version(ver).get_matches();

    let path = args::value(&args, "config").unwrap_or(config::PATH);
    let file = File::command(args.subcommand_name(), path)?;

    let count = args::occurrences(&args, "verbose");
    let (module, level) = args::verbosity(count, file.level()?);
    Builder::from_default_env().filter(module, level).init();

    debug!("configuration {:?}", file);

    match args.subcommand() {
        ("start",   Some(args)) => start(args, &file),
        ("init",    Some(_))    => init(path),
        ("version", Some(_))    => version(ver),
        _                       => banner(),
    }
}

fn init(path: &str) -> Result<()> {
    match config::init(path)? {
        true  => info!("configuration file '{}' created", path),
        false => info!("configuration file '{}' already exists", path),
    }
    Ok(())
}

fn version(ver: &str) -> Result<()> {
    println!("Version:        {}", ver);
    println!("Git commit:     {}", option_env!("GIT_COMMIT").unwrap_or(""));
    println!("Built:          {}", option_env!("BUILD_TIME").unwrap_or(""));
    Ok(())
}

fn banner() -> Result<()> {
    println!("{}", BANNER);
    println!("Welcome to ipscout! Use 'ipscout --help' to see available commands.");
    Ok(())
}
