use recast_api::mapping::RenameTable;

/// Compute the source field name to read for a target field.
///
/// Identity mapping is the default: only fields listed in `renames` read
/// from a differently named source field. Pure and infallible — absence of
/// the resolved field is the caller's concern.
pub fn resolve<'a>(target_field: &'a str, renames: &'a RenameTable) -> &'a str {
    renames.get(target_field).unwrap_or(target_field)
}
