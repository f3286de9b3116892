//! Class names produced by the classification model, indexed by output position.

pub const CLASS_NAMES: [&str; 26] = [
    "Maiyarab",
    "Maric",
    "Pipek",
    "Samanakkha",
    "Tosakanth",
    "Kabangna",
    "Mongkut Queen",
    "Yodchai Crown",
    "Radklao Plew",
    "Radklao Yod",
    "Hanuman",
    "Macchanu",
    "Nilanon",
    "Nilapat",
    "Ongot",
    "Pali",
    "Sukrip",
    "Phra Ganesha",
    "Phra Isuan",
    "Phra Narai",
    "Phra Panchasikhora",
    "Phra Phrom",
    "Phra Pirap",
    "Phra Prakhonthap",
    "Phra Witsanukam",
    "Phra Rishi",
];

/// Resolves a class index to its name, falling back to `Unknown Class N`.
pub fn class_name(index: usize) -> String {
    CLASS_NAMES
        .get(index)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown Class {index}"))
}

pub fn is_known_label(name: &str) -> bool {
    CLASS_NAMES.contains(&name)
}
