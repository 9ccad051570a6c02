//! Turning a requested location into a master.
//!
//! There is no interpolation: a location either lands exactly on a master or
//! the default master stands in for it.

use fontdoc::{store::Location, AxisData, FontData, MasterData};
use log::{debug, warn};

use crate::piecewise_linear_map::PiecewiseLinearMap;

/// Coordinates closer than this are the same coordinate.
const SAME_COORD: f64 = 1e-6;

/// The user to design space mapping of `axis`, identity if it has no map.
pub fn axis_map(axis: &AxisData) -> PiecewiseLinearMap {
    PiecewiseLinearMap::new(axis.map.clone().unwrap_or_default())
}

/// Map a user space location, keyed by axis tag, to design space.
///
/// Tags the font has no axis for pass through unchanged.
pub fn user_to_design(axes: &[AxisData], user: &Location) -> Location {
    user.iter()
        .map(|(tag, value)| {
            let value = match axes.iter().find(|axis| &axis.tag == tag) {
                Some(axis) => axis_map(axis).map(*value),
                None => {
                    warn!("No axis tagged '{tag}', using {value} as is");
                    *value
                }
            };
            (tag.clone(), value)
        })
        .collect()
}

/// Every axis with a default, at that default, in design space.
pub fn default_location(axes: &[AxisData]) -> Location {
    axes.iter()
        .filter_map(|axis| {
            axis.default
                .map(|default| (axis.tag.clone(), axis_map(axis).map(default)))
        })
        .collect()
}

/// Whether `master` sits at the design space location `location`.
///
/// Axes either side leaves out are taken to be at their default.
fn master_is_at(axes: &[AxisData], master: &MasterData, location: &Location) -> bool {
    let defaults = default_location(axes);
    let coord = |loc: Option<&Location>, tag: &str| {
        loc.and_then(|l| l.get(tag))
            .or_else(|| defaults.get(tag))
            .copied()
    };
    let tags = axes
        .iter()
        .map(|axis| axis.tag.as_str())
        .chain(location.keys().map(String::as_str));
    for tag in tags {
        match (coord(master.location.as_ref(), tag), coord(Some(location), tag)) {
            (Some(have), Some(want)) if (have - want).abs() <= SAME_COORD => (),
            (None, None) => (),
            _ => return false,
        }
    }
    true
}

/// The master at the default location, else the first master.
pub fn default_master(font: &FontData) -> Option<&MasterData> {
    let defaults = default_location(&font.axes);
    font.masters
        .iter()
        .find(|master| master_is_at(&font.axes, master, &defaults))
        .or_else(|| font.masters.first())
}

/// The master for a user space location.
///
/// An empty location means the default master. A location no master sits at
/// also gets the default master, with a warning.
pub fn master_for_location<'a>(font: &'a FontData, user: &Location) -> Option<&'a MasterData> {
    if user.is_empty() {
        return default_master(font);
    }
    let design = user_to_design(&font.axes, user);
    match font
        .masters
        .iter()
        .find(|master| master_is_at(&font.axes, master, &design))
    {
        Some(master) => {
            debug!("{user:?} is master '{}'", master.id);
            Some(master)
        }
        None => {
            let fallback = default_master(font);
            warn!(
                "No master at {user:?} (design {design:?}), using {:?}",
                fallback.map(|m| &m.id)
            );
            fallback
        }
    }
}
