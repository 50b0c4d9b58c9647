// SPDX-License-Identifier: GPL-3.0-or-later

use flaggen::{args, config, context, modes};
use std::env;
use std::process::ExitCode;

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Parse the command line arguments first, the verbosity drives the logging.
    let matches = args::cli().get_matches();
    let arguments = args::Arguments::try_from(matches)?;

    // Initialize the logging system. The environment overrides the verbosity.
    let level = match arguments.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::debug!("{pkg_name} v{pkg_version}");
    let os = env::consts::OS;
    let family = env::consts::FAMILY;
    let arch = env::consts::ARCH;
    log::debug!("Running on... {family}/{os} {arch}");

    // Capture application context.
    let context = context::Context::capture()?;
    log::debug!("{context}");
    log::debug!("{arguments}");
    // Load the configuration.
    let configuration = config::Loader::load(&context, &arguments.config)?;
    log::debug!("{configuration}");

    // Run the application.
    let application = match modes::Mode::configure(&context, arguments, configuration) {
        Ok(application) => application,
        Err(error) => {
            log::error!("flaggen: {error}");
            return Ok(error.exit_code());
        }
    };
    log::debug!("Configuration complete, running now...");
    let result = application.run();
    log::debug!("Exit code: {result:?}");

    Ok(result)
}
