//! Read-only data source definitions.

mod git_repositories;
mod group;
mod projects;
mod users;

pub use git_repositories::GitRepositoriesDataSource;
pub use group::GroupDataSource;
pub use projects::ProjectsDataSource;
pub use users::UsersDataSource;

use crate::error::FilterError;
use crate::filter::FieldAccessible;
use crate::provider::resource_data::AttrMap;

/// Collects the values of one named attribute across flattened records.
///
/// Records without the attribute are skipped; a non-string attribute is a
/// contract violation, like everywhere else in the filter.
pub(crate) fn attribute_values(
    items: &[AttrMap],
    attribute_name: &str,
) -> Result<Vec<String>, FilterError> {
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        if let Some(value) = item.field(attribute_name)? {
            values.push(value);
        }
    }
    Ok(values)
}
