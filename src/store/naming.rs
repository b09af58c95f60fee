use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Lower-cased vendor label → canonical channel name.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let table: &[(&str, &[&str])] = &[
        ("Airflow", &["flow patient", "flow", "airflow", "therm", "thermistor"]),
        ("Nasal Pressure", &["pressure", "ptaf", "cannula", "nasal pressure"]),
        ("C3-M2", &["c3-a2", "c3-m2"]),
        ("C4-M1", &["c4-a1", "c4-m1"]),
        ("O1-M2", &["o1-a2", "o1-m2"]),
        ("O2-M1", &["o2-a1", "o2-m1"]),
        ("F3-M2", &["f3-a2", "f3-m2"]),
        ("F4-M1", &["f4-a1", "f4-m1"]),
        ("E1-M2", &["loc-a2", "eog-l", "e1-m2", "loc"]),
        ("E2-M1", &["roc-a1", "eog-r", "e2-m1", "roc"]),
        ("SpO2", &["sao2", "sat", "spo2", "osat"]),
        ("Thorax", &["thor", "chest", "rip thora", "thorax"]),
        ("Abdomen", &["abdo", "abd", "rip abdom", "abdomen"]),
        ("ECG", &["ekg", "ecg", "ecg ii", "ecg2"]),
        ("Chin", &["chin", "chin1-chin2", "emg chin"]),
        ("Snore", &["snore", "snoring"]),
    ];
    table
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect()
});

const MODALITY_PREFIXES: [&str; 6] = ["eeg", "eog", "emg", "ecg", "ekg", "resp"];

/// Maps a vendor channel label to the name the rest of the system uses.
///
/// Unknown labels are returned trimmed but otherwise unchanged. A trailing
/// duplicate marker such as `#2` or `(2)` survives canonicalization, so two
/// distinct sources never collapse into one channel.
pub fn canonical_channel_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let (base, suffix) = split_duplicate_suffix(trimmed);
    match lookup(base) {
        Some(canonical) => format!("{canonical}{suffix}"),
        None => trimmed.to_owned(),
    }
}

fn lookup(base: &str) -> Option<&'static str> {
    let key = base.trim().to_lowercase();
    if let Some(canonical) = ALIASES.get(key.as_str()) {
        return Some(*canonical);
    }
    let stripped = strip_modality_prefix(&key)?;
    ALIASES.get(stripped).copied()
}

fn strip_modality_prefix(key: &str) -> Option<&str> {
    MODALITY_PREFIXES.iter().find_map(|prefix| {
        let rest = key.strip_prefix(prefix)?;
        let rest = rest.strip_prefix([' ', ':', '_', '-'])?.trim_start();
        (!rest.is_empty()).then_some(rest)
    })
}

fn split_duplicate_suffix(name: &str) -> (&str, &str) {
    if let Some(index) = name.rfind('#') {
        let digits = &name[index + 1..];
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            let base = name[..index].trim_end();
            return (base, &name[base.len()..]);
        }
    }
    if let Some(inner) = name.strip_suffix(')') {
        if let Some(index) = inner.rfind('(') {
            let digits = &inner[index + 1..];
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                let base = name[..index].trim_end();
                return (base, &name[base.len()..]);
            }
        }
    }
    (name, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_vendor_labels() {
        assert_eq!(canonical_channel_name("Flow Patient"), "Airflow");
        assert_eq!(canonical_channel_name("PTAF"), "Nasal Pressure");
        assert_eq!(canonical_channel_name("C3-A2"), "C3-M2");
        assert_eq!(canonical_channel_name("SaO2"), "SpO2");
        assert_eq!(canonical_channel_name("  EKG "), "ECG");
    }

    #[test]
    fn strips_modality_prefix() {
        assert_eq!(canonical_channel_name("EEG C4-A1"), "C4-M1");
        assert_eq!(canonical_channel_name("EOG:LOC-A2"), "E1-M2");
        assert_eq!(canonical_channel_name("Resp Chest"), "Thorax");
    }

    #[test]
    fn keeps_duplicate_markers() {
        assert_eq!(canonical_channel_name("C3-A2 #2"), "C3-M2 #2");
        assert_eq!(canonical_channel_name("Flow (2)"), "Airflow (2)");
        assert_ne!(
            canonical_channel_name("C3-A2"),
            canonical_channel_name("C3-A2 #2")
        );
    }

    #[test]
    fn unknown_labels_pass_through() {
        assert_eq!(canonical_channel_name("Leg/L"), "Leg/L");
        assert_eq!(canonical_channel_name("EEG"), "EEG");
        assert_eq!(canonical_channel_name("Position #"), "Position #");
    }
}
