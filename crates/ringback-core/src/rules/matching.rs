/// Case-insensitive substring containment of `first_name` within the name
/// returned by a lookup. No tokenization and no fuzzy distance.
pub fn first_name_matches(first_name: &str, found_name: &str) -> bool {
    let needle = first_name.to_lowercase();
    found_name.to_lowercase().contains(&needle)
}
