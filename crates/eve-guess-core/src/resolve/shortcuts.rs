//! Community abbreviations for common item names.

/// Abbreviation key → expansion, in lookup order.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("bcs", "Ballistic Control System"),
    ("dc", "Damage Control"),
    ("dda", "Drone Damage Amplifier"),
    ("dni", "Dominix Navy Issue"),
    ("fnc", "Federation Navy Comet"),
    ("hfi", "Hurricane Fleet Issue"),
    ("lsi", "Large Skill Injector"),
    ("mlu", "Mining Laser Upgrade"),
    ("mni", "Megathron Navy Issue"),
    ("mtu", "Mobile Tractor Unit"),
    ("rni", "Raven Navy Issue"),
    ("ssi", "Small Skill Injector"),
    ("vni", "Vexor Navy Issue"),
];

/// The first shortcut whose key starts with `token`, ignoring case.
pub fn find_shortcut(token: &str) -> Option<(&'static str, &'static str)> {
    if token.is_empty() {
        return None;
    }
    let token = token.to_lowercase();
    SHORTCUTS
        .iter()
        .find(|(key, _)| key.starts_with(token.as_str()))
        .copied()
}

/// Rewrite `query` with its first word expanded, if that word is a shortcut.
pub fn expand_shortcut(query: &str) -> Option<String> {
    let mut words = query.split_whitespace();
    let (_, expansion) = find_shortcut(words.next()?)?;

    let mut expanded = expansion.to_string();
    for word in words {
        expanded.push(' ');
        expanded.push_str(word);
    }
    Some(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(SHORTCUTS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_exact_and_prefix_keys() {
        assert_eq!(find_shortcut("BCS").map(|s| s.1), Some("Ballistic Control System"));
        assert_eq!(find_shortcut("mt").map(|s| s.0), Some("mtu"));
        // Ambiguous prefixes take the first key in table order.
        assert_eq!(find_shortcut("m").map(|s| s.0), Some("mlu"));
        assert!(find_shortcut("bcsx").is_none());
        assert!(find_shortcut("").is_none());
    }

    #[test]
    fn test_expand_keeps_remaining_words() {
        assert_eq!(
            expand_shortcut("bcs  ii").as_deref(),
            Some("Ballistic Control System ii")
        );
        assert_eq!(expand_shortcut("vni").as_deref(), Some("Vexor Navy Issue"));
        assert!(expand_shortcut("Jita").is_none());
        assert!(expand_shortcut("   ").is_none());
    }
}
