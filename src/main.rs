use anyhow::Result;
use argh::FromArgs;
use log::{LevelFilter, debug, warn};
use osshell::Interpreter;
use osshell::env::Environment;
use osshell::history::{HISTORY_FILE, History};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(FromArgs)]
/// OSShell: a minimal interactive command shell.
struct Options {
    /// file the command history is loaded from and saved to
    #[argh(option, default = "PathBuf::from(HISTORY_FILE)")]
    history_file: PathBuf,

    /// enable debug logging on stderr
    #[argh(switch, short = 'v')]
    verbose: bool,
}

fn main() {
    let options: Options = argh::from_env();
    init_logging(options.verbose);

    if let Err(err) = run(&options) {
        // Fatal: exits without saving history.
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn run(options: &Options) -> Result<()> {
    let mut env = Environment::new();
    debug!("search paths: {:?}", env.search_paths);

    // A broken history file degrades to an empty history; only a missing
    // one is fully silent.
    env.history = match History::load_from_path(&options.history_file) {
        Ok(history) => history,
        Err(err) => {
            warn!("{err:#}");
            History::new()
        }
    };

    println!("Welcome to OSShell! Please enter your commands ('exit' to quit).");

    let mut shell = Interpreter::with_default_commands(env);
    shell.repl()?;

    shell.environment().history.save_to_path(&options.history_file)
}
