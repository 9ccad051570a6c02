//! Outline, bounds, sidebearing and segment queries over a font document.

mod args;
pub mod error;
pub mod location;
pub mod measure;
pub mod piecewise_linear_map;
pub mod request;

pub use args::{Args, Command};
pub use error::Error;
pub use measure::{Flags, Query};
pub use request::{OutlineBounds, OutlineRecord, OutlineRequest};

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use fontdoc::{Document, EditContext, Glyph};
use log::debug;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

fn read_request(path: &Path) -> Result<OutlineRequest, Error> {
    let raw = fs::read_to_string(path).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|e| Error::BadRequest(path.to_path_buf(), e.to_string()))
}

fn records<T: Serialize>(
    glyphs: &[Glyph],
    measure: impl Fn(&Glyph) -> Result<Option<T>, Error>,
) -> Result<Value, Error> {
    let mut found = Vec::with_capacity(glyphs.len());
    for glyph in glyphs {
        if let Some(record) = measure(glyph)? {
            found.push(record);
        }
    }
    Ok(serde_json::to_value(found)?)
}

pub fn load(source: &Path) -> Result<Document, Error> {
    if !source.exists() {
        return Err(Error::FileExpected(PathBuf::from(source)));
    }
    Ok(Document::load(source, EditContext::new())?)
}

/// Answer the query `args` describe as JSON.
pub fn query(args: &Args) -> Result<Value, Error> {
    let doc = load(&args.source)?;
    let filter = args
        .glyph_name_filter
        .as_deref()
        .map(Regex::new)
        .transpose()?;
    let location = args.location();
    let flags = args.flags();
    debug!("Query {:?} at {location:?} with {flags:?}", args.command);

    let query = Query::new(&doc, &location, flags);
    match &args.command {
        Command::Outlines { glyphs, request } => {
            let mut request = match request {
                Some(path) => read_request(path)?,
                None => OutlineRequest {
                    glyph_names: if glyphs.is_empty() {
                        doc.read(|font| font.glyphs.iter().map(|g| g.name.to_string()).collect())
                    } else {
                        glyphs.clone()
                    },
                    location,
                    flatten_components: flags.contains(Flags::FLATTEN_COMPONENTS),
                },
            };
            if let Some(regex) = &filter {
                request.glyph_names.retain(|name| regex.is_match(name));
            }
            Ok(serde_json::to_value(request.resolve_in(&doc)?)?)
        }
        Command::Bounds { glyphs } => {
            records(&query.select(glyphs, filter.as_ref()), |g| query.bounds(g))
        }
        Command::Sidebearings { glyphs, y } => records(
            &query.select(glyphs, filter.as_ref()),
            |g| query.sidebearings(g, *y),
        ),
        Command::Segments { glyphs } => {
            records(&query.select(glyphs, filter.as_ref()), |g| query.segments(g))
        }
    }
}

/// Run the query and write pretty JSON to `out`.
pub fn run(args: &Args, out: &mut impl Write) -> Result<(), Error> {
    let value = query(args)?;
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out).map_err(Error::StdioWriteFail)
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use fontdoc::{Document, EditContext};

    pub(crate) fn testdata_dir() -> PathBuf {
        let mut dir = Path::new("../resources/testdata");
        if !dir.is_dir() {
            dir = Path::new("./resources/testdata");
        }
        assert!(dir.is_dir());
        dir.to_path_buf()
    }

    pub(crate) fn load_test_document(name: &str) -> Document {
        let _ = env_logger::builder().is_test(true).try_init();
        let file = testdata_dir().join(name);
        Document::load(&file, EditContext::new())
            .unwrap_or_else(|e| panic!("Unable to read {file:?}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;
    use crate::test::testdata_dir;

    fn args(source: &Path, rest: &[&str]) -> Args {
        let source = source.to_string_lossy().to_string();
        let mut argv = vec!["fontquery", "--source", source.as_str()];
        argv.extend_from_slice(rest);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_source() {
        let temp_dir = tempdir().unwrap();
        let args = args(&temp_dir.path().join("nope.babelfont"), &["bounds"]);
        assert!(matches!(query(&args), Err(Error::FileExpected(..))));
    }

    #[test]
    fn bad_filter() {
        let args = args(&testdata_dir().join("square.babelfont"), &["-g", "(", "bounds"]);
        assert!(matches!(query(&args), Err(Error::BadRegex(..))));
    }

    #[test]
    fn filtered_bounds() {
        let args = args(
            &testdata_dir().join("square.babelfont"),
            &["-g", "^sq", "bounds"],
        );
        assert_eq!(
            json!([{
                "name": "square",
                "bounds": {
                    "minX": 0.0, "minY": 0.0, "maxX": 100.0, "maxY": 100.0,
                    "width": 100.0, "height": 100.0
                }
            }]),
            query(&args).unwrap()
        );
    }

    #[test]
    fn outlines_from_request_file() {
        let temp_dir = tempdir().unwrap();
        let request = temp_dir.path().join("request.json");
        fs::write(
            &request,
            r#"{"glyphNames": ["stack", "ghost"], "location": {"wdth": 50}, "flattenComponents": true}"#,
        )
        .unwrap();
        let request = request.to_string_lossy().to_string();
        let args = args(
            &testdata_dir().join("components.babelfont"),
            &["outlines", "--request", request.as_str()],
        );
        let value = query(&args).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(2, records.len());
        assert_eq!(json!("stack"), records[0]["name"]);
        assert_eq!(json!(200.0), records[0]["bounds"]["xMax"]);
        // ghost only references a glyph that does not exist
        assert_eq!(json!([]), records[1]["shapes"]);
    }

    #[test]
    fn garbage_request_file() {
        let temp_dir = tempdir().unwrap();
        let request = temp_dir.path().join("request.json");
        fs::write(&request, "{").unwrap();
        let request = request.to_string_lossy().to_string();
        let args = args(
            &testdata_dir().join("square.babelfont"),
            &["outlines", "--request", request.as_str()],
        );
        assert!(matches!(query(&args), Err(Error::BadRequest(..))));
    }

    #[test]
    fn run_writes_json() {
        let args = args(
            &testdata_dir().join("square.babelfont"),
            &["sidebearings", "-y", "50", "square"],
        );
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        let written: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(
            json!([{
                "name": "square",
                "width": 150.0,
                "lsb": 0.0,
                "rsb": 50.0,
                "at": {"left": 0.0, "right": 50.0}
            }]),
            written
        );
    }

    #[test]
    fn cycles_are_reported() {
        let args = args(
            &testdata_dir().join("components.babelfont"),
            &["--flatten-components", "segments", "loop_a"],
        );
        let err = query(&args).unwrap_err();
        assert_eq!(
            "Component reference cycle: loop_a -> loop_b -> loop_a",
            err.to_string()
        );
    }
}
