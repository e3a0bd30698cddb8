use {
    anyhow::{Context as _, Result as Anyhow},
    formats::ImageDecoder,
    mksdlsfc::{convert, Config},
    std::process::ExitCode,
};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Anyhow<ExitCode> {
    log_init()?;

    let Ok(config) = Config::resolve(std::env::args_os(), |msg| eprint!("{msg}")) else {
        return Ok(ExitCode::FAILURE);
    };
    log::debug!("{config:?}");

    let decoder = ImageDecoder::default();
    convert(&decoder, &config)?;
    Ok(ExitCode::SUCCESS)
}

/// `MKSDLSFC_LOG` picks the level (warn by default); `MKSDLSFC_LOG_FILE`
/// also sends everything to a file.
fn log_init() -> Anyhow<()> {
    use simplelog::{
        ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode,
        WriteLogger,
    };

    let level = std::env::var("MKSDLSFC_LOG").ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Warn);

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    if let Some(path) = std::env::var_os("MKSDLSFC_LOG_FILE") {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating log file `{}'", path.to_string_lossy()))?;
        loggers.push(WriteLogger::new(level, simplelog::Config::default(), file));
    }

    CombinedLogger::init(loggers).context("installing logger")?;
    Ok(())
}
