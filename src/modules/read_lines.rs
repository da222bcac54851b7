// src/modules/read_lines.rs

//! Read a text file into its lines.

use std::fmt;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::engine::require_path;
use crate::errors::{ModuleError, Result};
use crate::module::{LogMessage, Module, ModuleContext, ModuleCore};
use crate::modules::ReadLinesResult;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TextEncoding {
    /// Strict: invalid sequences fail the read.
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// Invalid sequences become U+FFFD.
    #[serde(rename = "utf-8-lossy")]
    Utf8Lossy,
    #[serde(rename = "latin-1", alias = "iso-8859-1")]
    Latin1,
    #[serde(rename = "utf-16le")]
    Utf16le,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> io::Result<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
            TextEncoding::Utf8Lossy => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf16le => {
                let bytes = bytes.strip_prefix(UTF16LE_BOM).unwrap_or(bytes);
                if bytes.len() % 2 != 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "odd number of bytes in UTF-16LE text",
                    ));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Lossy => "utf-8-lossy",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf16le => "utf-16le",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReadLinesConfig {
    pub file_path: PathBuf,
    pub encoding: TextEncoding,
}

#[derive(Debug)]
pub struct ReadLinesModule {
    core: ModuleCore,
    config: ReadLinesConfig,
}

impl ReadLinesModule {
    pub const DEFAULT_NAME: &'static str = "Read Lines";

    pub fn new(ctx: &ModuleContext, config: ReadLinesConfig) -> Self {
        Self {
            core: ModuleCore::new(ctx, Self::DEFAULT_NAME),
            config,
        }
    }
}

#[async_trait]
impl Module for ReadLinesModule {
    type Output = ReadLinesResult;

    fn core(&self) -> &ModuleCore {
        &self.core
    }

    fn validate(&self) -> Result<()> {
        require_path(&self.config.file_path, "File")
    }

    async fn execute(&self) -> Result<ReadLinesResult> {
        let path = &self.config.file_path;
        let text = self
            .core
            .fs
            .read(path)
            .await
            .and_then(|bytes| self.config.encoding.decode(&bytes))
            .map_err(|e| {
                let err = ModuleError::io(path, e);
                self.core.log.error(LogMessage::failure(&err));
                err
            })?;

        // `str::lines` handles both `\n` and `\r\n` and drops the final empty line.
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        self.core.log.info(format!(
            "Read {} lines from \"{}\" ({})",
            lines.len(),
            path.display(),
            self.config.encoding
        ));
        Ok(ReadLinesResult { lines })
    }
}
