//! Where a movie comes from

use std::convert::Infallible;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{MovieError, Result};
use crate::movie::Movie;

/// Movie source given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `-`
    Stdin,
    /// `http://` or `https://` address
    Url(String),
    /// Anything else
    File(PathBuf),
}

impl Input {
    /// Whether the input is downloaded
    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stdin => "stdin",
            Self::Url(_) => "url",
            Self::File(_) => "file",
        }
    }

    /// Fetch the raw bytes
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Stdin => {
                let mut bytes = Vec::new();
                std::io::stdin().lock().read_to_end(&mut bytes)?;
                Ok(bytes)
            }
            Self::Url(url) => fetch_url(url),
            Self::File(path) => Ok(std::fs::read(path)?),
        }
    }

    /// Fetch and decode
    pub fn load(&self) -> Result<Movie> {
        match self {
            Self::Stdin => Movie::from_reader(&mut std::io::stdin().lock()),
            Self::Url(url) => Movie::from_buffer(&fetch_url(url)?),
            Self::File(path) => Movie::from_file(path),
        }
    }
}

impl FromStr for Input {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == "-" {
            Self::Stdin
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_owned())
        } else {
            Self::File(PathBuf::from(s))
        })
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("-"),
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Download a file with a blocking request
pub(crate) fn fetch_url(url: &str) -> Result<Vec<u8>> {
    tracing::debug!(url, "downloading");
    let response = reqwest::blocking::get(url)
        .map_err(|e| MovieError::Http(format!("Failed to download {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(MovieError::Http(format!(
            "Failed to download {url}: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| MovieError::Http(format!("Failed to read response body: {e}")))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!("-".parse::<Input>().unwrap(), Input::Stdin);
        assert_eq!(
            "https://example.com/a.swf".parse::<Input>().unwrap(),
            Input::Url("https://example.com/a.swf".into())
        );
        assert_eq!(
            "movies/a.swf".parse::<Input>().unwrap(),
            Input::File(PathBuf::from("movies/a.swf"))
        );
        assert!("http://x".parse::<Input>().unwrap().is_url());
    }

    #[test]
    fn test_display() {
        let input: Input = "movies/a.swf".parse().unwrap();
        assert_eq!(input.to_string(), "movies/a.swf");
        assert_eq!(input.kind(), "file");
    }

    #[test]
    fn test_missing_file() {
        let input = Input::File(PathBuf::from("/nonexistent/unpacker/a.swf"));
        assert!(matches!(input.read_bytes(), Err(MovieError::Io(_))));
    }
}
