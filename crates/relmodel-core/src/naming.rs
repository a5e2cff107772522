//! Field-name casing conversions.
//!
//! Records arrive with keys in either snake_case (database columns, Rust
//! fields) or PascalCase (records produced by other admin layers). Accessors
//! normalise between the two with these helpers.

/// Names whose PascalCase form is not derivable from the generic rule.
const CANONICAL: &[(&str, &str)] = &[
    ("id", "ID"),
    ("user_id", "UserID"),
    ("created_at", "CreatedAt"),
    ("updated_at", "UpdatedAt"),
    ("deleted_at", "DeletedAt"),
];

/// Convert a snake_case name to PascalCase.
///
/// ```
/// use relmodel_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("author_id"), "AuthorId");
/// assert_eq!(to_pascal_case("user_id"), "UserID");
/// assert_eq!(to_pascal_case("id"), "ID");
/// ```
pub fn to_pascal_case(name: &str) -> String {
    if let Some((_, pascal)) = CANONICAL.iter().find(|(snake, _)| *snake == name) {
        return (*pascal).to_string();
    }

    let mut out = String::with_capacity(name.len());
    for part in name.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Convert a PascalCase or camelCase name to snake_case.
///
/// Runs of capitals are treated as one acronym word, so `UserID` becomes
/// `user_id` and `HTTPServer` becomes `http_server`. Names that are already
/// snake_case are returned unchanged.
///
/// ```
/// use relmodel_core::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("UserID"), "user_id");
/// assert_eq!(to_snake_case("AuthorId"), "author_id");
/// assert_eq!(to_snake_case("created_at"), "created_at");
/// ```
pub fn to_snake_case(name: &str) -> String {
    if let Some((snake, _)) = CANONICAL.iter().find(|(_, pascal)| *pascal == name) {
        return (*snake).to_string();
    }

    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                None | Some('_') => false,
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                Some(_) => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Candidate keys to try, in order, when looking a name up in a map record:
/// the snake_case form, the PascalCase form, then the name verbatim.
pub fn lookup_candidates(name: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(3);
    for candidate in [to_snake_case(name), to_pascal_case(name), name.to_string()] {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}
