use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Confirm;
use indoc::indoc;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use hexlayout::{Highlight, HighlightSettings, highlight, highlight_master_boot_record, parse_hex_string};

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::exit;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Ansi,
    Html,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Layout {
    /// No layout, a plain dump.
    None,
    Pattern(PathBuf),
    MasterBootRecord,
}

struct HexlayoutDump {
    settings: HighlightSettings,
    /// `None` reads stdin.
    input: Option<PathBuf>,
    hex_input: bool,
    offset: usize,
    layout: Layout,
    output_format: OutputFormat,
    output: Box<dyn Write>,
    verbosity_level: Option<LevelFilter>,
}

impl HexlayoutDump {
    pub fn from_cli_matches(matches: &ArgMatches) -> Result<Self> {
        let input = match matches
            .get_one::<String>("INPUT")
            .map(String::as_str)
            .context("INPUT is a required argument")?
        {
            "-" => None,
            path => Some(PathBuf::from(path)),
        };

        let output_format = match matches
            .get_one::<String>("output-format")
            .map(String::as_str)
            .unwrap_or("text")
        {
            "ansi" => OutputFormat::Ansi,
            "html" => OutputFormat::Html,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        };

        let layout = if matches.get_flag("mbr") {
            Layout::MasterBootRecord
        } else if let Some(path) = matches.get_one::<String>("pattern") {
            Layout::Pattern(PathBuf::from(path))
        } else {
            Layout::None
        };

        let offset = matches.get_one::<usize>("offset").copied().unwrap_or(0);

        let mut settings = HighlightSettings::new().base_offset(offset as u64);
        if let Some(root) = matches.get_one::<String>("root") {
            settings = settings.root(root.as_str());
        }
        if let Some(&length) = matches.get_one::<usize>("length") {
            settings = settings.length(length);
        }

        let verbosity_level = match matches.get_count("verbose") {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            3 => Some(LevelFilter::Trace),
            _ => {
                eprintln!("using more than -vvv does not affect verbosity level");
                Some(LevelFilter::Trace)
            }
        };

        let output: Box<dyn Write> = if let Some(path) = matches.get_one::<String>("output-target") {
            let file = Self::create_output_file(path, !matches.get_flag("no-confirm-overwrite"))
                .with_context(|| format!("An error occurred while creating output file at `{}`", path))?;
            Box::new(file)
        } else {
            Box::new(io::stdout())
        };

        Ok(HexlayoutDump {
            settings,
            input,
            hex_input: matches.get_flag("hex"),
            offset,
            layout,
            output_format,
            output,
            verbosity_level,
        })
    }

    /// Main entry point for `HexlayoutDump`
    pub fn run(&mut self) -> Result<()> {
        self.try_to_initialize_logging();

        let data = self.read_input()?;
        let data = data.get(self.offset..).unwrap_or_default();
        info!("read 0x{:x} bytes after offset 0x{:x}", data.len(), self.offset);

        let result = match &self.layout {
            Layout::MasterBootRecord => highlight_master_boot_record(data, &self.settings),
            Layout::Pattern(path) => {
                let pattern_text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
                highlight(data, &pattern_text, &self.settings)
            }
            Layout::None => highlight(data, "", &self.settings),
        };

        for diagnostic in result.diagnostics() {
            eprintln!("warning: {}", diagnostic);
        }

        let rendered = self.render(&result)?;
        self.output
            .write_all(rendered.as_bytes())
            .context("Failed to write output")?;
        self.output.flush().context("Failed to flush output")?;

        Ok(())
    }

    fn read_input(&self) -> Result<Vec<u8>> {
        let raw = match &self.input {
            Some(path) => fs::read(path).with_context(|| format!("Failed to open file {}", path.display()))?,
            None => {
                let mut raw = Vec::new();
                io::stdin()
                    .read_to_end(&mut raw)
                    .context("Failed to read from stdin")?;
                raw
            }
        };

        if self.hex_input {
            let text = String::from_utf8_lossy(&raw);
            Ok(parse_hex_string(&text))
        } else {
            Ok(raw)
        }
    }

    fn render(&self, result: &Highlight<'_>) -> Result<String> {
        let rendered = match self.output_format {
            OutputFormat::Text => result.hexdump()?,
            OutputFormat::Ansi => result.ansi_dump()?,
            OutputFormat::Html => result.html()?,
            OutputFormat::Json => {
                let mut json = result.to_json()?;
                json.push('\n');
                json
            }
        };
        Ok(rendered)
    }

    /// If `prompt` is passed, will display a confirmation prompt before overwriting files.
    fn create_output_file(path: impl AsRef<Path>, prompt: bool) -> Result<File> {
        let p = path.as_ref();

        if p.is_dir() {
            bail!("There is a directory at {}, refusing to overwrite", p.display());
        }

        if p.exists() {
            if prompt {
                let confirmed = Confirm::new()
                    .with_prompt(format!(
                        "Are you sure you want to override output file at {}",
                        p.display()
                    ))
                    .default(false)
                    .interact()
                    .context("Failed to write confirmation prompt to term")?;
                if !confirmed {
                    bail!("Cancelled");
                }
            }
            return Ok(File::create(p)?);
        }

        // Ok to assume p is not an existing directory
        match p.parent() {
            Some(parent) => {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
                Ok(File::create(p)?)
            }
            None => bail!("Output file cannot be root."),
        }
    }

    fn try_to_initialize_logging(&self) {
        if let Some(level) = self.verbosity_level {
            match TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
                Ok(_) => {}
                Err(e) => eprintln!("Failed to initialize logging: {}", e),
            };
        }
    }
}

fn command() -> Command {
    Command::new("hexlayout_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Utility to dump binary data highlighted by a structure layout")
        .long_about(indoc!(r#"
            Dumps binary data as a hex/ASCII listing, coloring every byte by the structure
            field it belongs to.

            The layout comes either from a pattern file (`--pattern`), written as C-like
            `struct` definitions, or from the built-in master boot record map (`--mbr`).
            Without either, the data is dumped unstyled.
        "#))
        .arg(
            Arg::new("INPUT")
                .required(true)
                .help("Input file, or `-` to read stdin."),
        )
        .arg(
            Arg::new("hex")
                .long("hex")
                .action(ArgAction::SetTrue)
                .help("Treat the input as text of hex digit pairs (whitespace ignored, malformed pairs dropped)."),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .short('p')
                .value_name("FILE")
                .conflicts_with("mbr")
                .help("Pattern file describing the layout."),
        )
        .arg(
            Arg::new("mbr")
                .long("mbr")
                .action(ArgAction::SetTrue)
                .help("Use the built-in master boot record layout."),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .short('r')
                .value_name("NAME")
                .help("Structure to start from (default: main)."),
        )
        .arg(
            Arg::new("output-format")
                .long("format")
                .short('o')
                .value_parser(["text", "ansi", "html", "json"])
                .default_value("text")
                .help("Sets the output format")
                .long_help(indoc!(r#"
                    Sets the output format:
                        "text" - plain hex dump.
                        "ansi" - hex dump colored with terminal escape codes.
                        "html" - inline markup with tooltips and a stylesheet.
                        "json" - settings, structures, regions and diagnostics.
                "#)),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Start reading the input at byte N. N is also the first offset displayed."),
        )
        .arg(
            Arg::new("length")
                .long("length")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Only consider N bytes."),
        )
        .arg(
            Arg::new("output-target")
                .long("output")
                .short('f')
                .value_name("FILE")
                .help("Writes output to the file specified instead of stdout, errors will still be printed to stderr. \
                       Will ask for confirmation before overwriting files, to allow overwriting, pass `--no-confirm-overwrite`. \
                       Will create parent directories if needed."),
        )
        .arg(
            Arg::new("no-confirm-overwrite")
                .long("no-confirm-overwrite")
                .action(ArgAction::SetTrue)
                .help("When set, will not ask for confirmation before overwriting files, useful for automation"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("-v - info, -vv - debug, -vvv - trace."),
        )
}

fn main() {
    let matches = command().get_matches();

    let result = HexlayoutDump::from_cli_matches(&matches).and_then(|mut app| app.run());
    if let Err(e) = result {
        eprintln!("{:?}", e);
        exit(1);
    }
}
