use super::args::{Cli, Commands};
use super::handlers;
use crate::config::Config;
use crate::logging;
use crate::render::Palette;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(config.output.format);
    let palette = Palette::new(cli.color.unwrap_or(config.output.color).enabled());

    match cli.command {
        Commands::Parse { paths, pretty } => {
            let logs = handlers::parse_inputs(&paths, &config.parser)?;
            handlers::parse::handle(&logs, pretty)
        }

        Commands::Summary { paths } => {
            let logs = handlers::parse_inputs(&paths, &config.parser)?;
            handlers::summary::handle(&logs, format, palette)
        }

        Commands::Errors { paths, errors_only } => {
            let logs = handlers::parse_inputs(&paths, &config.parser)?;
            handlers::errors::handle(&logs, errors_only, format, palette)
        }

        Commands::Categories { paths } => {
            let logs = handlers::parse_inputs(&paths, &config.parser)?;
            handlers::categories::handle(&logs, format, palette)
        }
    }
}
