use crate::classifier::ClassificationEntry;
use crate::vehicle::VehicleSignal;
use image::RgbImage;
use sha2::{Digest, Sha256};

/// Fraction of the draw space that maps to a damaged verdict.
const DAMAGE_THRESHOLD: f64 = 0.7;

/// The final structured judgment for one analyzed image.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub is_legal: bool,
    pub confidence: f32,
    pub verdict_text: String,
    pub details: Vec<String>,
}

/// Derives the legality verdict from the detection outcome and image content.
///
/// Byte-identical uploads always produce the identical verdict: the damage
/// draw is a pure function of the decoded pixel content, never of ambient
/// RNG state.
pub fn generate_verdict(
    image: &RgbImage,
    signal: &VehicleSignal,
    entries: &[ClassificationEntry],
) -> Verdict {
    let confidence = entries.first().map(|entry| entry.score).unwrap_or(0.0);

    if !signal.is_vehicle {
        let detected = entries
            .first()
            .map(|entry| entry.label.as_str())
            .unwrap_or_default();

        return Verdict {
            is_legal: false,
            confidence,
            verdict_text: "No Vehicle Detected".to_string(),
            details: vec![
                format!("Detected: {}", detected),
                "Please upload a clear car photo".to_string(),
            ],
        };
    }

    damage_verdict(content_draw(image), confidence, &signal.primary_label)
}

fn damage_verdict(draw: f64, confidence: f32, primary_label: &str) -> Verdict {
    if draw > DAMAGE_THRESHOLD {
        Verdict {
            is_legal: false,
            confidence,
            verdict_text: "Severe Damage".to_string(),
            details: vec![
                "Structural frame damage detected".to_string(),
                "Headlight assembly broken".to_string(),
                "Bumper detached".to_string(),
                format!("Identified as: {}", primary_label),
            ],
        }
    } else {
        Verdict {
            is_legal: true,
            confidence,
            verdict_text: "Road Legal".to_string(),
            details: vec![
                "Chassis integrity confirmed".to_string(),
                "Lighting systems functional".to_string(),
                "Glass intact".to_string(),
                format!("Identified as: {}", primary_label),
            ],
        }
    }
}

/// Deterministic draw in [0, 1) from the full pixel content.
///
/// The seed covers dimensions plus every RGB byte, so the draw is stable
/// across restarts and platforms but differs between visually distinct
/// images.
fn content_draw(image: &RgbImage) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_be_bytes());
    hasher.update(image.height().to_be_bytes());
    hasher.update(image.as_raw());
    let digest = hasher.finalize();

    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    let seed = u64::from_be_bytes(seed_bytes);

    // Top 53 bits of the seed scaled into the unit interval.
    (seed >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn car_entries() -> Vec<ClassificationEntry> {
        vec![
            ClassificationEntry {
                label: "sports car".to_string(),
                score: 0.91,
            },
            ClassificationEntry {
                label: "racer".to_string(),
                score: 0.05,
            },
            ClassificationEntry {
                label: "car wheel".to_string(),
                score: 0.02,
            },
        ]
    }

    fn vehicle_signal() -> VehicleSignal {
        VehicleSignal {
            is_vehicle: true,
            primary_label: "sports car".to_string(),
        }
    }

    fn test_image(seed: u8) -> RgbImage {
        ImageBuffer::from_fn(32, 32, |x, y| {
            Rgb([seed, (x % 256) as u8, (y % 256) as u8])
        })
    }

    #[test]
    fn no_vehicle_branch_is_exact() {
        let entries = vec![
            ClassificationEntry {
                label: "golden retriever".to_string(),
                score: 0.83,
            },
            ClassificationEntry {
                label: "Labrador retriever".to_string(),
                score: 0.1,
            },
            ClassificationEntry {
                label: "tennis ball".to_string(),
                score: 0.02,
            },
        ];
        let signal = VehicleSignal {
            is_vehicle: false,
            primary_label: "golden retriever".to_string(),
        };

        let verdict = generate_verdict(&test_image(0), &signal, &entries);

        assert!(!verdict.is_legal);
        assert_eq!(verdict.confidence, 0.83);
        assert_eq!(verdict.verdict_text, "No Vehicle Detected");
        assert_eq!(
            verdict.details,
            vec![
                "Detected: golden retriever".to_string(),
                "Please upload a clear car photo".to_string(),
            ]
        );
    }

    #[test]
    fn vehicle_branch_yields_one_of_two_verdicts() {
        let verdict = generate_verdict(&test_image(7), &vehicle_signal(), &car_entries());

        assert!(verdict.verdict_text == "Road Legal" || verdict.verdict_text == "Severe Damage");
        assert_eq!(verdict.confidence, 0.91);
        assert_eq!(
            verdict.details.last().unwrap(),
            "Identified as: sports car"
        );
    }

    #[test]
    fn identical_content_yields_identical_verdicts() {
        let first = generate_verdict(&test_image(42), &vehicle_signal(), &car_entries());

        for _ in 0..10 {
            let repeat = generate_verdict(&test_image(42), &vehicle_signal(), &car_entries());
            assert_eq!(repeat, first);
        }
    }

    #[test]
    fn draw_above_threshold_means_damaged() {
        let verdict = damage_verdict(0.9, 0.91, "sports car");

        assert!(!verdict.is_legal);
        assert_eq!(verdict.verdict_text, "Severe Damage");
        assert_eq!(
            verdict.details,
            vec![
                "Structural frame damage detected".to_string(),
                "Headlight assembly broken".to_string(),
                "Bumper detached".to_string(),
                "Identified as: sports car".to_string(),
            ]
        );
    }

    #[test]
    fn draw_below_threshold_means_road_legal() {
        let verdict = damage_verdict(0.3, 0.91, "sports car");

        assert!(verdict.is_legal);
        assert_eq!(verdict.verdict_text, "Road Legal");
        assert_eq!(
            verdict.details,
            vec![
                "Chassis integrity confirmed".to_string(),
                "Lighting systems functional".to_string(),
                "Glass intact".to_string(),
                "Identified as: sports car".to_string(),
            ]
        );
    }

    #[test]
    fn content_draw_is_in_unit_interval() {
        for seed in 0..16 {
            let draw = content_draw(&test_image(seed));
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn different_content_usually_draws_differently() {
        let a = content_draw(&test_image(1));
        let b = content_draw(&test_image(2));

        assert_ne!(a, b);
    }
}
