//! I/O errors surfaced at the compiler/embedding boundary.
//!
//! These never enter the diagnostic sink: a file that can't be read never
//! produces a `Source` to attach a `Span` to in the first place.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("could not read source file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
