use phototagger::detection::{aggregate, rank, RawDetection};
use phototagger::keywords::{decode_metadata_field, encode_for_metadata_field, to_delimited_string};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn ranking_is_a_permutation_of_unique_labels(
        (w, h, detections) in proptest_helpers::arb_scene(24)
    ) {
        let set = aggregate(detections, w, h).expect("positive frame");
        let mut ranked = rank(&set);
        let mut unique: Vec<String> = set.labels_unique().into_iter().map(String::from).collect();

        ranked.sort();
        unique.sort();
        prop_assert_eq!(ranked, unique);
    }

    #[test]
    fn ranking_orders_by_area_then_first_occurrence(
        (w, h, detections) in proptest_helpers::arb_scene(24)
    ) {
        let set = aggregate(detections, w, h).expect("positive frame");
        let ranked = set.labels_ranked_by_area();
        let first_seen = set.labels_unique();
        let position = |label: &str| first_seen.iter().position(|l| *l == label).unwrap();

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].pixel_area >= pair[1].pixel_area);
            prop_assert!(pair[0].relative_area >= pair[1].relative_area);
            if pair[0].pixel_area == pair[1].pixel_area {
                prop_assert_eq!(pair[0].relative_area, pair[1].relative_area);
                prop_assert!(position(&pair[0].label) < position(&pair[1].label));
            }
        }
    }

    #[test]
    fn relative_areas_sum_to_covered_share(
        (w, h, detections) in proptest_helpers::arb_scene(24)
    ) {
        let set = aggregate(detections, w, h).expect("positive frame");
        let total: f64 = set.relative_area_by_label().iter().map(|e| e.relative_area).sum();
        let pixels: i64 = set.records().iter().map(|r| r.area()).sum();

        prop_assert!((total - pixels as f64 / set.parent_area() as f64).abs() < 1e-9);
        prop_assert!(set.relative_area_by_label().iter().all(|e| e.relative_area >= 0.0));
    }

    #[test]
    fn ranking_is_deterministic(
        (w, h, detections) in proptest_helpers::arb_scene(24)
    ) {
        let first = rank(&aggregate(detections.clone(), w, h).expect("positive frame"));
        let second = rank(&aggregate(detections, w, h).expect("positive frame"));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn larger_total_area_ranks_first(
        (heavy, light, detections) in proptest_helpers::arb_dominance_scene()
    ) {
        let ranked = rank(&aggregate(detections, 100, 100).expect("positive frame"));
        prop_assert_eq!(ranked, vec![heavy, light]);
    }

    #[test]
    fn full_frame_label_ranks_first(
        (w, h, mut detections) in proptest_helpers::arb_scene(8)
    ) {
        let full = i64::from(w) * i64::from(h);
        let covered: i64 = detections.iter().map(|d| d.bbox.area()).sum();
        detections.push(RawDetection::new((0, 0, i64::from(w), i64::from(h)), "elephant", 0.5));

        let ranked = rank(&aggregate(detections, w, h).expect("positive frame"));
        if full > covered {
            prop_assert_eq!(ranked[0].as_str(), "elephant");
        }
    }

    #[test]
    fn keyword_string_splits_back_into_ranking(
        (w, h, detections) in proptest_helpers::arb_scene(24)
    ) {
        let ranked = rank(&aggregate(detections, w, h).expect("positive frame"));
        let joined = to_delimited_string(&ranked, ",");

        prop_assert!(!joined.ends_with(','));
        if ranked.is_empty() {
            prop_assert_eq!(joined, "");
        } else {
            let parts: Vec<&str> = joined.split(',').collect();
            prop_assert_eq!(parts, ranked.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }

    #[test]
    fn metadata_encoding_has_expected_layout(text in proptest_helpers::arb_keyword_text()) {
        let bytes = encode_for_metadata_field(&text);

        prop_assert_eq!(bytes.len(), 2 * (text.encode_utf16().count() + 1));
        prop_assert_eq!(&bytes[bytes.len() - 2..], &[0u8, 0u8][..]);
        prop_assert_eq!(decode_metadata_field(&bytes), text);
    }
}
