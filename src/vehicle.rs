use crate::classifier::ClassificationEntry;

// ImageNet class names (or fragments of them) that describe road vehicles.
// Matching is by substring over the lower-cased label.
const VEHICLE_KEYWORDS: [&str; 23] = [
    "ambulance",
    "beach wagon",
    "cab",
    "convertible",
    "jeep",
    "limousine",
    "minivan",
    "model t",
    "racer",
    "sports car",
    "station wagon",
    "tow truck",
    "trailer truck",
    "truck",
    "van",
    "police van",
    "recreational vehicle",
    "pickup",
    "moving van",
    "minibus",
    "school bus",
    "trolleybus",
    "car wheel",
];

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSignal {
    pub is_vehicle: bool,
    pub primary_label: String,
}

/// Decides whether the ranked labels describe a vehicle.
///
/// Any of the entries may carry the evidence; `primary_label` is always the
/// top-1 label regardless of which entry matched.
pub fn detect_vehicle(entries: &[ClassificationEntry]) -> VehicleSignal {
    let is_vehicle = entries.iter().any(|entry| {
        let label = entry.label.to_lowercase();
        VEHICLE_KEYWORDS.iter().any(|k| label.contains(k)) || label.contains("car")
    });

    let primary_label = entries
        .first()
        .map(|entry| entry.label.clone())
        .unwrap_or_default();

    VehicleSignal {
        is_vehicle,
        primary_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(labels: &[(&str, f32)]) -> Vec<ClassificationEntry> {
        labels
            .iter()
            .map(|(label, score)| ClassificationEntry {
                label: label.to_string(),
                score: *score,
            })
            .collect()
    }

    #[test]
    fn top_label_keyword_is_a_vehicle() {
        let signal = detect_vehicle(&entries(&[
            ("sports car", 0.91),
            ("racer", 0.05),
            ("car wheel", 0.02),
        ]));

        assert!(signal.is_vehicle);
        assert_eq!(signal.primary_label, "sports car");
    }

    #[test]
    fn lower_ranked_match_still_counts() {
        let signal = detect_vehicle(&entries(&[
            ("golden retriever", 0.6),
            ("tow truck", 0.3),
            ("tabby", 0.05),
        ]));

        assert!(signal.is_vehicle);
        assert_eq!(signal.primary_label, "golden retriever");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let signal = detect_vehicle(&entries(&[("Trolleybus", 0.8), ("obelisk", 0.1), ("pier", 0.05)]));

        assert!(signal.is_vehicle);
    }

    #[test]
    fn literal_car_substring_matches() {
        // "freight car" carries no keyword from the set but contains "car".
        let signal = detect_vehicle(&entries(&[
            ("freight car", 0.7),
            ("obelisk", 0.1),
            ("pier", 0.05),
        ]));

        assert!(signal.is_vehicle);
    }

    #[test]
    fn animals_are_not_vehicles() {
        let signal = detect_vehicle(&entries(&[
            ("golden retriever", 0.8),
            ("tabby", 0.1),
            ("tiger shark", 0.05),
        ]));

        assert!(!signal.is_vehicle);
        assert_eq!(signal.primary_label, "golden retriever");
    }
}
