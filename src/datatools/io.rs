//! Reading and writing result sets and filesets.
//!
//! Both are JSON. A path ending in `.gz` is read and written gzip-compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::datatools::accumulator::ResultSet;
use crate::datatools::errors::DataToolsError;
use crate::datatools::fileset::Fileset;
use crate::util::fs::ensure_dir;

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DataToolsError + '_ {
    move |source| DataToolsError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataToolsError> {
    let file = File::open(path).map_err(io_error(path))?;
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    serde_json::from_reader(reader).map_err(|source| {
        // Decompression failures surface through the JSON reader
        if source.is_io() {
            DataToolsError::Io {
                path: path.to_path_buf(),
                source: source.into(),
            }
        } else {
            DataToolsError::Json {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DataToolsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).map_err(|e| DataToolsError::Io {
            path: parent.to_path_buf(),
            source: std::io::Error::other(format!("{:#}", e)),
        })?;
    }

    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);

    if is_gzip(path) {
        let mut encoder = GzEncoder::new(&mut writer, Compression::default());
        serde_json::to_writer(&mut encoder, value).map_err(|source| DataToolsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        encoder.finish().map_err(io_error(path))?;
    } else {
        serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
            DataToolsError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        writer.write_all(b"\n").map_err(io_error(path))?;
    }

    writer.flush().map_err(io_error(path))
}

/// Load a result set.
pub fn load_results(path: &Path) -> Result<ResultSet, DataToolsError> {
    read_json(path)
}

/// Save a result set.
pub fn save_results(path: &Path, results: &ResultSet) -> Result<(), DataToolsError> {
    write_json(path, results)
}

/// Load a fileset.
pub fn load_fileset(path: &Path) -> Result<Fileset, DataToolsError> {
    read_json(path)
}
