use clap::Args;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEMO_INPUT: &str = "この剣士は甘棒で人なつっこい天子です。";

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),
}

#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Transcript text to process
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the transcript from a file ("-" for stdin)
    #[arg(long, short = 'f', value_name = "path")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Text(String),
    File(PathBuf),
    Stdin,
    Demo,
}

impl InputArgs {
    /// Pick the input: explicit text, then a file, then piped stdin, then
    /// the demo sentence.
    pub fn source(&self, stdin_is_terminal: bool) -> InputSource {
        if let Some(text) = &self.text {
            return InputSource::Text(text.clone());
        }
        match &self.file {
            Some(path) if path.as_os_str() == "-" => InputSource::Stdin,
            Some(path) => InputSource::File(path.clone()),
            None if !stdin_is_terminal => InputSource::Stdin,
            None => InputSource::Demo,
        }
    }

    pub fn read(&self) -> Result<String, InputError> {
        self.source(io::stdin().is_terminal()).read()
    }
}

impl InputSource {
    pub fn read(&self) -> Result<String, InputError> {
        match self {
            InputSource::Text(text) => Ok(text.clone()),
            InputSource::File(path) => read_file(path),
            InputSource::Stdin => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(InputError::Stdin)?;
                Ok(buf)
            }
            InputSource::Demo => Ok(DEMO_INPUT.to_string()),
        }
    }
}

fn read_file(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::File {
        path: path.to_path_buf(),
        source,
    })
}
