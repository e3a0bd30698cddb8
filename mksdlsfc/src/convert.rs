use {
    crate::{codegen, Config},
    camino::{Utf8Path as Path, Utf8PathBuf as PathBuf},
    formats::{Decode, DecodeError},
    pixmap::Pixmap,
    std::{
        fs::File,
        io::{self, BufWriter, Write},
    },
};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Error opening `{path}' for writing")]
    Open { path: PathBuf, source: io::Error },
    #[error("Error converting image `{path}'")]
    Decode { path: PathBuf, source: DecodeError },
    #[error("Error writing `{path}'")]
    Write { path: PathBuf, source: io::Error },
}

/// Files created during one conversion. Unless kept, they are deleted again
/// when this is dropped.
#[derive(Default)]
struct Outputs {
    paths: Vec<PathBuf>,
    keep:  bool,
}

impl Outputs {
    fn create(&mut self, path: &Path) -> Result<BufWriter<File>, ConvertError> {
        let file = File::create(path)
            .map_err(|source| ConvertError::Open{path: path.to_owned(), source})?;
        self.paths.push(path.to_owned());
        Ok(BufWriter::new(file))
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for Outputs {
    fn drop(&mut self) {
        if self.keep {return}
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => log::debug!("removed {path}"),
                Err(err) => log::warn!("failed to remove {path}: {err}"),
            }
        }
    }
}

fn write_error(path: &Path) -> impl FnOnce(io::Error) -> ConvertError + '_ {
    move |source| ConvertError::Write{path: path.to_owned(), source}
}

fn write_outputs<H, S>(config: &Config, pixmap: &Pixmap, header: &mut H, implementation: &mut S)
    -> Result<(), ConvertError>
where
    H: Write,
    S: Write,
{
    codegen::write_header(header, config.symbol())
        .and_then(|()| header.flush())
        .map_err(write_error(config.header()))?;

    codegen::write_implementation(implementation, pixmap, config.symbol())
        .and_then(|()| implementation.flush())
        .map_err(write_error(config.source()))
}

/// Decodes the configured image and writes its header and implementation.
/// Nothing is left behind on failure.
pub fn convert<D>(decoder: &D, config: &Config) -> Result<(), ConvertError> where
    D: Decode + ?Sized,
{
    // writers are declared later so they close before any cleanup
    let mut outputs = Outputs::default();
    let mut header = outputs.create(config.header())?;
    let mut implementation = outputs.create(config.source())?;

    log::debug!("decoding {}", config.image());
    let pixmap = decoder.decode(config.image())
        .map_err(|source| ConvertError::Decode{path: config.image().to_owned(), source})?;

    write_outputs(config, &pixmap, &mut header, &mut implementation)?;

    outputs.keep();
    log::info!("{}: wrote {} and {} ({}x{}, {} pixel bytes)",
        config.image(), config.header(), config.source(),
        pixmap.wide(), pixmap.high(), pixmap.as_bytes().len());
    Ok(())
}
