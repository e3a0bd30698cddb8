use {
    camino::{Utf8Path as Path, Utf8PathBuf as PathBuf},
    clap::{builder::NonEmptyStringValueParser, Arg, ArgAction, ArgMatches, ColorChoice, Command},
    std::ffi::OsString,
};

const PROGRAM: &str = "mksdlsfc";

const IMAGE:  &str = "image";
const SYMBOL: &str = "symbol";
const SOURCE: &str = "source";
const HEADER: &str = "header";

/// Option flags: id, short flag, value name.
const FLAGS: [(&str, char, &str); 3] = [
    (SYMBOL, 'n', "SURFACENAME"),
    (SOURCE, 'o', "SOURCEFILE"),
    (HEADER, 'h', "HEADERFILE"),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No image file specified.")]
    MissingImage,
    #[error("extra argument `{0}' found.")]
    ExtraArgument(String),
    #[error("extra option -{flag} found with argument `{arg}'.")]
    ExtraOption { flag: char, arg: String },
    #[error("surface name `{0}' is not a valid C identifier.")]
    InvalidSymbol(String),
    #[error("{first} and {second} are both `{path}'.")]
    SamePath { first: &'static str, second: &'static str, path: PathBuf },
    #[error("{0}")]
    Cmdline(String),
}

/// Everything one conversion needs to know, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    image:  PathBuf,
    source: PathBuf,
    header: PathBuf,
    symbol: String,
}

impl Config {
    /// Resolves a full command line, program name first.
    ///
    /// On failure the error and a usage line are passed to `report` before
    /// the error is returned.
    pub fn resolve<I, T>(args: I, mut report: impl FnMut(&str)) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let program = args.first()
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_else(|| PROGRAM.to_owned());

        Self::parse(args).map_err(|err| {
            report(&format!("ERROR: {err}\n"));
            report(&usage(&program));
            err
        })
    }

    fn parse(args: Vec<OsString>) -> Result<Config, ConfigError> {
        let matches = command()
            .try_get_matches_from(args)
            .map_err(|err| ConfigError::Cmdline(clap_message(&err)))?;

        // report whichever repeat comes first on the command line
        let repeat = [IMAGE, SYMBOL, SOURCE, HEADER].into_iter()
            .filter_map(|id| repeated(&matches, id))
            .min_by_key(|&(index, _)| index);
        if let Some((_, err)) = repeat {return Err(err)}

        let image: PathBuf = single(&matches, IMAGE)
            .ok_or(ConfigError::MissingImage)?
            .into();

        let symbol = match single(&matches, SYMBOL) {
            Some(symbol) if is_identifier(&symbol) => symbol,
            Some(symbol) => return Err(ConfigError::InvalidSymbol(symbol)),
            None => default_symbol(&image),
        };

        let source = single(&matches, SOURCE)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_source(&symbol));

        let header = single(&matches, HEADER)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_header(&source));

        // outputs are truncated on open and removed on failure
        let named = [("image file", &image), ("source file", &source), ("header file", &header)];
        for (i, &(first, a)) in named.iter().enumerate() {
            for &(second, b) in &named[i + 1 ..] {
                if same_file(a, b) {
                    return Err(ConfigError::SamePath{first, second, path: b.clone()});
                }
            }
        }

        Ok(Config{image, source, header, symbol})
    }

    pub fn image(&self) -> &Path { &self.image }
    pub fn source(&self) -> &Path { &self.source }
    pub fn header(&self) -> &Path { &self.header }
    pub fn symbol(&self) -> &str { &self.symbol }
}

pub fn usage(program: &str) -> String {
    format!("USAGE: {program} [-n SURFACENAME] [-o SOURCEFILE] [-h HEADERFILE] IMAGEFILE\n")
}

fn command() -> Command {
    let flags = FLAGS.map(|(id, short, value_name)| {
        Arg::new(id)
            .short(short)
            .value_name(value_name)
            .value_parser(NonEmptyStringValueParser::new())
            .num_args(1)
            .allow_hyphen_values(true)
            .action(ArgAction::Append)
    });

    let image = Arg::new(IMAGE)
        .value_name("IMAGEFILE")
        .value_parser(NonEmptyStringValueParser::new())
        .num_args(1..)
        .action(ArgAction::Append);

    Command::new(PROGRAM)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .color(ColorChoice::Never)
        .args(flags)
        .arg(image)
}

fn clap_message(err: &clap::Error) -> String {
    let text = err.to_string();
    let line = text.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_owned()
}

fn single(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_many::<String>(id)?.next().cloned()
}

/// Command-line position and error for the second occurrence of `id`.
fn repeated(matches: &ArgMatches, id: &str) -> Option<(usize, ConfigError)> {
    let index = matches.indices_of(id)?.nth(1)?;
    let arg = matches.get_many::<String>(id)?.nth(1)?.clone();
    let err = match FLAGS.iter().find(|&&(flag_id, ..)| flag_id == id) {
        Some(&(_, flag, _)) => ConfigError::ExtraOption{flag, arg},
        None => ConfigError::ExtraArgument(arg),
    };
    Some((index, err))
}

/// Equal paths, or existing paths that resolve to the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {return true}
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// The image's file name without directories or extension, made into an
/// identifier.
pub fn default_symbol(image: &Path) -> String {
    let stem = image.file_stem().unwrap_or(image.as_str());
    sanitize_symbol(stem)
}

pub fn default_source(symbol: &str) -> PathBuf {
    format!("{symbol}.c").into()
}

/// `x.c` becomes `x.h`; anything else just gets `.h` appended.
pub fn default_header(source: &Path) -> PathBuf {
    match source.as_str().strip_suffix(".c") {
        Some(base) => format!("{base}.h").into(),
        None       => format!("{source}.h").into(),
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn sanitize_symbol(name: &str) -> String {
    let mut symbol: String = name.chars()
        .map(|c| if c.is_ascii_alphanumeric() {c} else {'_'})
        .collect();
    if !symbol.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        symbol.insert(0, '_');
    }
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(args: &[&str]) -> (Result<Config, ConfigError>, Vec<String>) {
        let mut reports = Vec::new();
        let result = Config::resolve(args.iter().copied(), |msg| reports.push(msg.to_owned()));
        (result, reports)
    }

    fn resolved(args: &[&str]) -> Config {
        let (result, reports) = resolve(args);
        assert!(reports.is_empty(), "{reports:?}");
        result.unwrap()
    }

    #[test]
    fn explicit_values_are_kept() {
        let config = resolved(&[
            "mksdlsfc", "-n", "logo", "-o", "gen/logo_data.cc", "-h", "inc/logo.hh", "img/logo.png",
        ]);
        assert_eq!(config.image().as_str(), "img/logo.png");
        assert_eq!(config.source().as_str(), "gen/logo_data.cc");
        assert_eq!(config.header().as_str(), "inc/logo.hh");
        assert_eq!(config.symbol(), "logo");
    }

    #[test]
    fn flags_may_follow_the_image_and_take_attached_values() {
        let config = resolved(&["mksdlsfc", "logo.png", "-nicon", "-oicon.c"]);
        assert_eq!(config.symbol(), "icon");
        assert_eq!(config.source().as_str(), "icon.c");
        assert_eq!(config.header().as_str(), "icon.h");
    }

    #[test]
    fn everything_derives_from_the_image() {
        let config = resolved(&["mksdlsfc", "picture.png"]);
        assert_eq!(config.symbol(), "picture");
        assert_eq!(config.source().as_str(), "picture.c");
        assert_eq!(config.header().as_str(), "picture.h");
        assert_eq!(config, resolved(&["mksdlsfc", "picture.png"]));
    }

    #[test]
    fn derived_symbols_drop_directories_and_extension() {
        let config = resolved(&["mksdlsfc", "assets/ui/my-logo.v2.png"]);
        assert_eq!(config.symbol(), "my_logo_v2");
        assert_eq!(config.source().as_str(), "my_logo_v2.c");
        assert_eq!(config.header().as_str(), "my_logo_v2.h");
    }

    #[test]
    fn header_follows_an_explicit_source() {
        let config = resolved(&["mksdlsfc", "-o", "x.data", "picture.png"]);
        assert_eq!(config.symbol(), "picture");
        assert_eq!(config.source().as_str(), "x.data");
        assert_eq!(config.header().as_str(), "x.data.h");

        let config = resolved(&["mksdlsfc", "-o", "x.c", "picture.png"]);
        assert_eq!(config.header().as_str(), "x.h");
    }

    #[test]
    fn source_follows_an_explicit_symbol() {
        let config = resolved(&["mksdlsfc", "-n", "sprite", "-h", "sprites.h", "picture.png"]);
        assert_eq!(config.source().as_str(), "sprite.c");
        assert_eq!(config.header().as_str(), "sprites.h");
    }

    #[test]
    fn default_header_rules() {
        assert_eq!(default_header(Path::new("x.c")).as_str(), "x.h");
        assert_eq!(default_header(Path::new("x.data")).as_str(), "x.data.h");
        assert_eq!(default_header(Path::new("dir.c/x")).as_str(), "dir.c/x.h");
        assert_eq!(default_header(Path::new("x.cc")).as_str(), "x.cc.h");
    }

    #[test]
    fn symbols_are_sanitized() {
        assert_eq!(default_symbol(Path::new("3d.png")), "_3d");
        assert_eq!(default_symbol(Path::new("über.jpg")), "_ber");
        assert_eq!(default_symbol(Path::new("noext")), "noext");
        assert_eq!(default_symbol(Path::new(".png")), "_png");
        assert!(is_identifier("_a1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn repeated_flags_are_rejected() {
        let (result, reports) = resolve(&["mksdlsfc", "-n", "a", "pic.png", "-n", "b"]);
        assert!(matches!(
            result,
            Err(ConfigError::ExtraOption{flag: 'n', ref arg}) if arg == "b",
        ));
        assert_eq!(reports, [
            "ERROR: extra option -n found with argument `b'.\n",
            "USAGE: mksdlsfc [-n SURFACENAME] [-o SOURCEFILE] [-h HEADERFILE] IMAGEFILE\n",
        ]);
    }

    #[test]
    fn repeated_images_are_rejected() {
        let (result, reports) = resolve(&["./conv", "a.png", "b.png"]);
        assert!(matches!(result, Err(ConfigError::ExtraArgument(ref arg)) if arg == "b.png"));
        assert_eq!(reports, [
            "ERROR: extra argument `b.png' found.\n",
            "USAGE: ./conv [-n SURFACENAME] [-o SOURCEFILE] [-h HEADERFILE] IMAGEFILE\n",
        ]);
    }

    #[test]
    fn first_repeat_is_reported() {
        let (result, _) = resolve(&["mksdlsfc", "-o", "a.c", "x.png", "-o", "b.c", "y.png"]);
        assert!(matches!(
            result,
            Err(ConfigError::ExtraOption{flag: 'o', ref arg}) if arg == "b.c",
        ));

        let (result, _) = resolve(&["mksdlsfc", "x.png", "y.png", "-h", "a.h", "-h", "b.h"]);
        assert!(matches!(result, Err(ConfigError::ExtraArgument(ref arg)) if arg == "y.png"));
    }

    #[test]
    fn image_is_required() {
        let (result, reports) = resolve(&["mksdlsfc", "-n", "logo"]);
        assert!(matches!(result, Err(ConfigError::MissingImage)));
        assert_eq!(reports[0], "ERROR: No image file specified.\n");
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn explicit_symbol_must_be_an_identifier() {
        let (result, reports) = resolve(&["mksdlsfc", "-n", "my-logo", "logo.png"]);
        assert!(matches!(result, Err(ConfigError::InvalidSymbol(ref name)) if name == "my-logo"));
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn malformed_command_lines_are_rejected() {
        let cases: [&[&str]; 3] = [
            &["mksdlsfc", "-x", "logo.png"],
            &["mksdlsfc", "logo.png", "-n"],
            &["mksdlsfc", "-o", "", "logo.png"],
        ];
        for args in cases {
            let (result, reports) = resolve(args);
            assert!(matches!(result, Err(ConfigError::Cmdline(_))), "{args:?}");
            assert!(reports[0].starts_with("ERROR: "));
            assert!(reports[1].starts_with("USAGE: mksdlsfc "));
        }
    }

    #[test]
    fn values_may_start_with_a_dash() {
        let config = resolved(&["mksdlsfc", "-o", "-out.c", "x.png"]);
        assert_eq!(config.source().as_str(), "-out.c");
        assert_eq!(config.header().as_str(), "-out.h");

        let config = resolved(&["mksdlsfc", "-h", "-x.h", "x.png"]);
        assert_eq!(config.header().as_str(), "-x.h");

        let (result, _) = resolve(&["mksdlsfc", "-n", "-dash", "x.png"]);
        assert!(matches!(result, Err(ConfigError::InvalidSymbol(ref name)) if name == "-dash"));
    }

    #[test]
    fn source_may_not_be_the_image() {
        let (result, reports) = resolve(&["mksdlsfc", "foo.c"]);
        assert!(matches!(
            result,
            Err(ConfigError::SamePath{first: "image file", second: "source file", ref path})
                if path.as_str() == "foo.c",
        ));
        assert_eq!(reports, [
            "ERROR: image file and source file are both `foo.c'.\n",
            "USAGE: mksdlsfc [-n SURFACENAME] [-o SOURCEFILE] [-h HEADERFILE] IMAGEFILE\n",
        ]);

        let (result, _) = resolve(&["mksdlsfc", "-o", "pic.png", "pic.png"]);
        assert!(matches!(result, Err(ConfigError::SamePath{second: "source file", ..})));
    }

    #[test]
    fn header_may_not_be_the_image() {
        let (result, reports) = resolve(&["mksdlsfc", "-h", "pic.png", "pic.png"]);
        assert!(matches!(
            result,
            Err(ConfigError::SamePath{first: "image file", second: "header file", ref path})
                if path.as_str() == "pic.png",
        ));
        assert_eq!(reports[0], "ERROR: image file and header file are both `pic.png'.\n");

        // derived from `-o foo.c`
        let (result, _) = resolve(&["mksdlsfc", "-o", "foo.c", "foo.h"]);
        assert!(matches!(result, Err(ConfigError::SamePath{second: "header file", ..})));
    }

    #[test]
    fn source_may_not_be_the_header() {
        let (result, reports) = resolve(&["mksdlsfc", "-o", "out.c", "-h", "out.c", "pic.png"]);
        assert!(matches!(
            result,
            Err(ConfigError::SamePath{first: "source file", second: "header file", ref path})
                if path.as_str() == "out.c",
        ));
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn paths_naming_one_existing_file_collide() {
        let dir = std::env::temp_dir().join(format!("mksdlsfc-config-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("sub")).unwrap();
        std::fs::write(dir.join("pic.png"), b"").unwrap();
        let dir = PathBuf::from_path_buf(dir).unwrap();

        let image = dir.join("pic.png");
        let source = dir.join("sub/../pic.png");
        let (result, _) = resolve(&["mksdlsfc", "-o", source.as_str(), image.as_str()]);
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(result, Err(ConfigError::SamePath{second: "source file", ..})));
    }
}
