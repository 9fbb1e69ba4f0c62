/*!
 * Command-line interface for nearwait
 */

use std::io;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use nearwait::archive::TarTxtarArchiver;
use nearwait::config::{Args, Command, Config, Settings};
use nearwait::generator::ManifestGenerator;
use nearwait::logging::init_logging;
use nearwait::processor::{ManifestProcessor, ProcessOutcome};
use nearwait::report::{ReportFormat, Reporter};
use nearwait::store::ManifestStore;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "nearwait", &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(args.config.as_deref())?;
    let command = args.command.clone();
    let config = Config::from_args(args, settings);

    init_logging(config.verbose, config.log_format);
    config.validate()?;

    if let Some(command) = command {
        return run_command(&config, command);
    }

    let manifest_path = config.normalizer().normalize(&config.manifest_file)?;

    let generator = ManifestGenerator::new(&config)?;
    if generator.generate(config.force, &config.manifest_file)? {
        println!("{} generated successfully", manifest_path.display());
        return Ok(());
    }

    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len}") {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("Packing");

    let start_time = Instant::now();
    let processor = ManifestProcessor::new(&config).with_archiver(TarTxtarArchiver::new(progress.clone()));
    let outcome = processor.process();
    progress.finish_and_clear();

    match outcome? {
        ProcessOutcome::Empty => {
            eprintln!("Manifest file list is empty from {}", manifest_path.display());
        }
        ProcessOutcome::Processed(report) => {
            Reporter::new(ReportFormat::ConsoleTable).print_report(&report, start_time.elapsed());
        }
    }

    Ok(())
}

/// Toggle or query a single manifest entry
fn run_command(config: &Config, command: Command) -> io::Result<()> {
    let store = ManifestStore::new(config.normalizer(), config.path_style);
    let manifest = &config.manifest_file;

    match command {
        Command::Enable { path } => {
            store.enable(manifest, &path)?;
            println!("Enabled {}", path.display());
        }
        Command::Disable { path } => {
            store.disable(manifest, &path)?;
            println!("Disabled {}", path.display());
        }
        Command::Status { path } => {
            let status = store.status(manifest, &path)?;
            println!("{}: {}", path.display(), status);
        }
    }

    Ok(())
}
