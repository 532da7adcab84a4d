pub mod error;
pub mod analyzer;

pub mod prelude {
    pub use super::{
        analyzer::*,
        error::*
    };
}

use std::{path::PathBuf, rc::Rc};

use utf8_chars::BufReadCharsExt;

use crate::{
    analyzer::prelude::ModuleAnalyzer,
    parser::prelude::{parse_source, parse_source_from_stream, Source},
    utils::prelude::{Error, TypeWarningEmitter, WarningEmitter, WarningEmitterIO},
};

/// Reads, parses and analyzes the program at `path`, returning the
/// annotated tree.
pub fn analyze(path: PathBuf, warnings: Rc<dyn WarningEmitterIO>) -> Result<Source, Error> {
    let src = match std::fs::read_to_string(&path) {
        Ok(src) => src,
        Err(err) => return Err(Error::StdIo { err: err.kind() }),
    };

    let parsed = match parse_source(&src) {
        Ok(parsed) => parsed,
        Err(error) => return Err(Error::Parse { path, src, error }),
    };

    let emitter = TypeWarningEmitter::new(
        path.clone(),
        src.clone(),
        WarningEmitter::new(warnings),
    );

    match ModuleAnalyzer::analyze(&parsed, &emitter) {
        Ok(()) => Ok(parsed),
        Err(error) => Err(Error::Type { path, src, error }),
    }
}

/// Like [`analyze`], but feeds the lexer from a buffered reader instead
/// of materializing the file into a string first. The source text is
/// still accumulated on the side for diagnostics.
pub fn analyze_from_stream(
    path: PathBuf,
    warnings: Rc<dyn WarningEmitterIO>,
) -> Result<Source, Error> {
    let file = match std::fs::File::open(&path) {
        Ok(file) => file,
        Err(err) => return Err(Error::StdIo { err: err.kind() }),
    };

    let file_size = file
        .metadata()
        .map_err(|err| Error::StdIo { err: err.kind() })?
        .len() as usize;

    let mut src = String::with_capacity(file_size);
    let mut reader = std::io::BufReader::new(file);
    let stream = reader.chars().map(|c| {
        let c = c.expect("source file read");
        src.push(c);
        c
    });

    let parsed = match parse_source_from_stream(stream) {
        Ok(parsed) => parsed,
        Err(error) => return Err(Error::Parse { path, src, error }),
    };

    let emitter = TypeWarningEmitter::new(
        path.clone(),
        src.clone(),
        WarningEmitter::new(warnings),
    );

    match ModuleAnalyzer::analyze(&parsed, &emitter) {
        Ok(()) => Ok(parsed),
        Err(error) => Err(Error::Type { path, src, error }),
    }
}

#[cfg(test)]
mod tests;
