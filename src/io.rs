use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::ExtractionError;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Compression {
    Plain,
    Gzip,
}

/// Decide how a text input is compressed from its file name.
///
/// `.gz` and `.bgz` are read with a multi-member gzip decoder, which also
/// handles bgzip output. bzip2 is recognised only to be rejected with a
/// readable error.
pub fn determine_compression(file_path: &Path) -> Result<Compression, ExtractionError> {
    let file_name = file_path
        .file_name()
        .ok_or_else(|| {
            ExtractionError::UnsupportedFormat(format!(
                "invalid file path {}: no file name found",
                file_path.display()
            ))
        })?
        .to_string_lossy()
        .to_ascii_lowercase();

    if file_name.ends_with(".gz") || file_name.ends_with(".bgz") {
        Ok(Compression::Gzip)
    } else if file_name.ends_with(".bz2") {
        Err(ExtractionError::UnsupportedFormat(format!(
            "bzip2 compressed input is not supported: {}",
            file_name
        )))
    } else {
        Ok(Compression::Plain)
    }
}

/// Open a possibly compressed text file for buffered reading.
pub fn open_text_file(file_path: &Path) -> Result<Box<dyn BufRead + Send>, ExtractionError> {
    let compression = determine_compression(file_path)?;
    let file = File::open(file_path)?;

    let stream: Box<dyn BufRead + Send> = match compression {
        Compression::Plain => Box::new(BufReader::new(file)),
        Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file)))),
    };
    Ok(stream)
}
