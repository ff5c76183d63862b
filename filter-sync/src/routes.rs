/// Extracts the list-route key from a navigable path.
///
/// The key is the single path segment following `base_path`, with any query
/// string stripped. Detail and form sub-routes (`/students/42`,
/// `/students/new`, `/students/42/edit`) have more than one segment and
/// yield `None`.
pub fn route_key_for_path<'a>(path: &'a str, base_path: &str) -> Option<&'a str> {
    let path = path.split('?').next().unwrap_or(path);
    let rest = path.strip_prefix(base_path)?;
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    let mut segments = rest.split('/').filter(|segment| !segment.is_empty());
    let key = segments.next()?;
    if segments.next().is_some() {
        return None;
    }
    Some(key)
}
