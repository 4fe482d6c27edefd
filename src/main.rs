use anyhow::Result;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "i18n-add-or-update",
    version,
    about = "Add or update translations for every locale from one editor session"
)]
struct Cli {
    /// Number of key blocks to prepare in the scratch file
    #[arg(
        short = 'n',
        long = "count",
        default_value_t = i18n_add_or_update::DEFAULT_EXPECTED_TRANSLATIONS
    )]
    count: usize,

    /// Editor command (overrides settings, $VISUAL and $EDITOR)
    #[arg(short = 'e', long = "editor")]
    editor: Option<String>,

    /// Directory holding the <locale>.yml files
    #[arg(short = 'd', long = "locales-dir")]
    locales_dir: Option<String>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Print the entered translations as JSON instead of writing locale files
    #[arg(long = "print-json")]
    print_json: bool,

    /// Summary format
    #[arg(long = "format", value_enum, default_value = "text")]
    format: FormatArg,

    /// Do not print the editor hint line
    #[arg(long = "no-hint")]
    no_hint: bool,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for i18n_add_or_update::ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    i18n_add_or_update::logging::init(cli.verbose)?;

    let output = i18n_add_or_update::run(i18n_add_or_update::Config {
        count: cli.count,
        editor: cli.editor,
        locales_dir: cli.locales_dir,
        settings_path: cli.read_settings,
        print_json: cli.print_json,
        report_format: cli.format.into(),
        interactive: !cli.no_hint,
    })?;

    println!("{}", output);
    Ok(())
}
