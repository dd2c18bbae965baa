//! Extrapolation Guard.

use roost_core::entities::Site;
use roost_core::enums::ExtrapolationFlag;

/// Classify `year` against the site's observed window. Both window ends count
/// as within range.
#[must_use]
pub const fn flag(site: &Site, year: i32) -> ExtrapolationFlag {
    if year < site.first_observed_year {
        ExtrapolationFlag::ExtrapolatedBefore
    } else if year > site.last_observed_year {
        ExtrapolationFlag::ExtrapolatedAfter
    } else {
        ExtrapolationFlag::WithinRange
    }
}
