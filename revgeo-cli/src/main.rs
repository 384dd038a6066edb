use anyhow::Result;
use revgeo_core::{GeocodeEngine, Settings};

mod cli;
mod logging;

fn main() -> Result<()> {
    let args = cli::parse_args();

    logging::init(&args.log_file, args.verbose);
    log::info!("Reverse geocoding started");

    // Config file first, then command-line values fill the gaps
    let mut settings = Settings::load(&args.config);
    settings.apply_overrides(&args.overrides());

    let job = match settings.validate() {
        Ok(job) => job,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let engine = GeocodeEngine::with_baidu(job)?;
    let summary = engine.run();

    if !summary.output_written {
        log::warn!(
            "Output was not written to {}",
            summary.output_path.display()
        );
    }

    println!("Total locations processed: {}", summary.total);
    println!("Successful geocoding: {}", summary.with_address);
    log::info!("Total locations processed: {}", summary.total);
    log::info!("Successful geocoding: {}", summary.with_address);

    Ok(())
}
