//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fontdoc::store::Location;

use crate::measure::Flags;

/// What would you like to know about your font?
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct Args {
    /// A babelfont JSON document
    #[arg(short, long)]
    pub source: PathBuf,

    /// Glyph names must match this regex to be processed
    #[arg(short, long)]
    #[clap(default_value = None)]
    pub glyph_name_filter: Option<String>,

    /// A user space coordinate as tag=value, e.g. wght=700. Repeat for more axes.
    ///
    /// No coordinates means the default location.
    #[arg(short, long = "location", value_parser = parse_coord)]
    pub locations: Vec<(String, f64)>,

    /// Resolve components into paths before measuring
    #[arg(long)]
    pub flatten_components: bool,

    /// Whether anchors count towards bounds
    #[arg(long)]
    pub include_anchors: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Outline records with shapes and bounds
    Outlines {
        /// Glyphs to report, all glyphs if none are named
        glyphs: Vec<String>,

        /// Read the request from this JSON file instead of the command line
        #[arg(long)]
        request: Option<PathBuf>,
    },
    /// Bounding boxes
    Bounds {
        /// Glyphs to report, all glyphs if none are named
        glyphs: Vec<String>,
    },
    /// Left and right sidebearings
    Sidebearings {
        /// Glyphs to report, all glyphs if none are named
        glyphs: Vec<String>,

        /// Also measure along the horizontal line at this height
        #[arg(short, long)]
        y: Option<f64>,
    },
    /// Line and curve segments of each path
    Segments {
        /// Glyphs to report, all glyphs if none are named
        glyphs: Vec<String>,
    },
}

fn parse_coord(raw: &str) -> Result<(String, f64), String> {
    let (tag, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected tag=value, got '{raw}'"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value for '{tag}': {e}"))?;
    Ok((tag.trim().to_string(), value))
}

impl Args {
    /// Collect various relevant flags into a [`Flags`] object.
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::default();

        flags.set(Flags::FLATTEN_COMPONENTS, self.flatten_components);
        flags.set(Flags::INCLUDE_ANCHORS, self.include_anchors);

        flags
    }

    pub fn location(&self) -> Location {
        self.locations.iter().cloned().collect()
    }
}
