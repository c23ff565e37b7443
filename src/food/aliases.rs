use std::collections::HashMap;

// Classifier labels and common spellings → IFCT dataset standard names.
const ALIASES: &[(&str, &str)] = &[
    // South Indian
    ("idli", "idli"),
    ("plain idli", "idli"),
    ("rava idli", "idli"),
    ("dosa", "dosa"),
    ("masala dosa", "dosa"),
    ("rava dosa", "dosa"),
    ("uttapam", "uttapam"),
    ("vada", "vada"),
    ("medu vada", "vada"),
    // North Indian & snacks
    ("samosa", "samosa, fried"),
    ("pakora", "pakora"),
    ("chole bhature", "chole bhature"),
    ("pav bhaji", "pav bhaji"),
    ("biryani", "biryani"),
    // Paneer dishes
    ("paneer butter masala", "paneer curry"),
    ("shahi paneer", "paneer curry"),
    ("kadai paneer", "paneer curry"),
    ("palak paneer", "palak paneer"),
    ("matar paneer", "paneer curry"),
    // Sweets
    ("gulab jamun", "gulab jamun (sweet)"),
    ("rasgulla", "rasgulla"),
    ("jalebi", "jalebi"),
    ("laddu", "laddu"),
    ("barfi", "barfi"),
    ("halwa", "halwa"),
    ("kheer", "kheer"),
    // Street food
    ("pani puri", "pani puri"),
    ("golgappa", "pani puri"),
    ("sev puri", "sev puri"),
    ("dahi puri", "dahi puri"),
    ("poha", "poha"),
];

pub fn normalize(name: &str) -> String {
    name.to_lowercase().trim().replace('_', " ")
}

/// Lookup table from free-text food labels to IFCT dataset names. Built once
/// at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::bundled()
    }
}

impl AliasTable {
    pub fn bundled() -> Self {
        Self {
            entries: ALIASES
                .iter()
                .map(|(label, canonical)| (label.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Canonical IFCT name for a label. Unknown labels pass through
    /// normalized so they can still be searched under their own name.
    pub fn map_to_ifct(&self, name: &str) -> Option<String> {
        if name.trim().is_empty() {
            return None;
        }
        let clean = normalize(name);
        Some(self.entries.get(&clean).cloned().unwrap_or(clean))
    }

    pub fn is_indian_food(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        self.entries.contains_key(&normalize(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_aliases_map_to_canonical_names() {
        let table = AliasTable::bundled();
        assert_eq!(table.map_to_ifct("Masala_Dosa").as_deref(), Some("dosa"));
        assert_eq!(table.map_to_ifct("GOLGAPPA").as_deref(), Some("pani puri"));
        assert_eq!(
            table.map_to_ifct("  samosa ").as_deref(),
            Some("samosa, fried")
        );
    }

    #[test]
    fn every_alias_key_maps_regardless_of_case_and_underscores() {
        let table = AliasTable::bundled();
        for (label, canonical) in ALIASES {
            let shouty = label.to_uppercase().replace(' ', "_");
            assert_eq!(table.map_to_ifct(&shouty).as_deref(), Some(*canonical));
            assert!(table.is_indian_food(&shouty));
        }
    }

    #[test]
    fn unknown_names_pass_through_normalized() {
        let table = AliasTable::bundled();
        assert_eq!(
            table.map_to_ifct("Banana_Split").as_deref(),
            Some("banana split")
        );
    }

    #[test]
    fn blank_input_maps_to_nothing() {
        let table = AliasTable::bundled();
        assert_eq!(table.map_to_ifct(""), None);
        assert_eq!(table.map_to_ifct("   "), None);
        assert!(!table.is_indian_food(""));
    }

    #[test]
    fn only_alias_keys_count_as_indian() {
        let table = AliasTable::bundled();
        assert!(table.is_indian_food("idli"));
        assert!(table.is_indian_food("Medu_Vada"));
        assert!(!table.is_indian_food("banana"));
        // Canonical names are flagged only when they are themselves keys:
        // "samosa" maps to "samosa, fried", which is not a key.
        assert!(!table.is_indian_food("samosa, fried"));
    }
}
