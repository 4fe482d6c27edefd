use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::info;

use crate::locales::LocaleSet;
use crate::translations::{self, TranslationRecord};

const FALLBACK_EDITOR: &str = "vim";
const WAITING_HINT: &str = "hint: Waiting for your editor to close the file...";

/// Opens a file for the user and returns once they are done with it.
pub trait Editor {
    fn edit(&self, path: &Path) -> Result<()>;
}

/// Runs an editor command line through the platform shell, so values such
/// as `code --wait` keep their arguments.
#[derive(Debug, Clone)]
pub struct CommandEditor {
    command: String,
}

impl CommandEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Picks the first non-empty of `configured`, `$VISUAL`, `$EDITOR`, then
    /// falls back to `vim`.
    pub fn resolve(configured: Option<&str>) -> Self {
        let from_env = |name: &str| std::env::var(name).ok();
        let command = [
            configured.map(str::to_string),
            from_env("VISUAL"),
            from_env("EDITOR"),
        ]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        Self::new(command)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn shell_command(&self, path: &Path) -> Command {
        if cfg!(windows) {
            let mut command = Command::new("cmd");
            command
                .arg("/C")
                .arg(format!("{} \"{}\"", self.command, path.display()));
            command
        } else {
            let mut command = Command::new("sh");
            command
                .arg("-c")
                .arg(format!("{} \"$1\"", self.command))
                .arg("editor")
                .arg(path);
            command
        }
    }
}

impl Editor for CommandEditor {
    fn edit(&self, path: &Path) -> Result<()> {
        info!(editor = %self.command, path = %path.display(), "launching editor");
        let status = self
            .shell_command(path)
            .status()
            .with_context(|| format!("failed to launch editor '{}'", self.command))?;
        if !status.success() {
            return Err(anyhow!(
                "editor '{}' exited with {}",
                self.command,
                status
            ));
        }
        Ok(())
    }
}

/// Whether the session talks to a terminal user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Interactive,
    Quiet,
}

/// A uniquely named scratch file that is removed when dropped.
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    pub fn create(content: &str) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("translations-")
            .suffix(".txt")
            .tempfile()
            .with_context(|| "failed to create scratch file")?;
        let path = file.path().to_path_buf();
        file.write_all(content.as_bytes())
            .and_then(|()| file.flush())
            .with_context(|| format!("failed to write scratch file: {}", path.display()))?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Reads the file by path, since editors often replace it instead of
    /// writing in place.
    pub fn read(&self) -> Result<String> {
        fs::read_to_string(self.path())
            .with_context(|| format!("failed to read scratch file: {}", self.path().display()))
    }

    pub fn close(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.file
            .close()
            .with_context(|| format!("failed to remove scratch file: {}", path.display()))
    }
}

/// Writes the template, lets the user fill it in and returns the cleaned
/// batch. The scratch file is gone afterwards, also when the editor fails.
pub fn fetch_translations<E: Editor + ?Sized>(
    editor: &E,
    locales: &LocaleSet,
    expected: usize,
    interaction: Interaction,
) -> Result<Vec<TranslationRecord>> {
    let scratch = ScratchFile::create(&translations::render_template(locales, expected))?;

    if interaction == Interaction::Interactive {
        let mut stderr = io::stderr();
        writeln!(stderr, "{}", WAITING_HINT)?;
        stderr.flush()?;
    }
    let edited = editor.edit(scratch.path());
    if interaction == Interaction::Interactive {
        // cursor up one line, then clear it
        let mut stderr = io::stderr();
        write!(stderr, "\x1b[A\x1b[K")?;
        stderr.flush()?;
    }
    edited?;

    let content = scratch.read()?;
    scratch.close()?;

    let parsed = translations::parse_user_input(&content, locales);
    Ok(translations::clean_translations(parsed))
}
