use crate::drive::DriveService;
use crate::error::Result;

pub const SEPARATOR: &str = " \u{00BB} ";

/// Breadcrumb of the folders above `id`, outermost first, e.g.
/// `My Drive » Projects » 2024`. The entry's own name is not part of it.
///
/// Only the first parent is followed at each level. An entry without
/// parents yields an empty string.
pub fn location_string<D: DriveService + ?Sized>(drive: &D, id: &str) -> Result<String> {
    let mut names = Vec::new();
    let mut parents = drive.parents(id)?;

    while let Some(parent) = parents.into_iter().next() {
        parents = drive.parents(&parent.id)?;
        names.push(parent.name);
    }

    names.reverse();
    Ok(names.join(SEPARATOR))
}
