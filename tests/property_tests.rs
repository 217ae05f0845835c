use image::{ColorType, DynamicImage, GenericImageView};
use proptest::prelude::*;
use std::path::Path;
use supplier_ingest::scanner::matches_extension;
use supplier_ingest::{parse_weight, ImageTransformer, PipelineConfig, RecordParser};

proptest! {
    #[test]
    fn weight_keeps_leading_number_and_drops_unit(
        value in 0u32..100_000u32,
        cents in 0u32..100u32,
        unit in "[a-zA-Z]{1,6}"
    ) {
        let expected = value as f64 + cents as f64 / 100.0;
        let line = format!("{} {}", expected, unit);
        let weight = parse_weight(&line).unwrap();
        prop_assert_eq!(weight.value(), expected);
    }

    #[test]
    fn weight_rejects_non_numeric_tokens(token in "[a-zA-Z][a-zA-Z]{0,8}", unit in "[a-z]{0,4}") {
        prop_assume!(!matches!(
            token.to_lowercase().as_str(),
            "inf" | "infinity" | "nan"
        ));
        let line = format!("{} {}", token, unit);
        prop_assert!(parse_weight(&line).is_err());
    }

    #[test]
    fn image_name_ignores_fourth_line(
        base in "[a-z0-9_-]{1,12}",
        hint in "[ -~]{0,20}"
    ) {
        let parser = RecordParser::new("jpeg");
        let content = format!("Name\n1 lbs\nDescription\n{}", hint);
        let record = parser.parse_str(&base, &content).unwrap();
        prop_assert_eq!(record.image_name, format!("{}.jpeg", base));
    }

    #[test]
    fn fewer_than_three_lines_are_rejected(lines in prop::collection::vec("[a-z0-9 ]{1,10}", 0..3)) {
        let parser = RecordParser::new("jpeg");
        prop_assert!(parser.parse_str("x", &lines.join("\n")).is_err());
    }

    #[test]
    fn extension_match_is_case_insensitive(stem in "[a-z]{1,8}", upper in any::<bool>()) {
        let ext = if upper { "TIF" } else { "tif" };
        let name = format!("{}.{}", stem, ext);
        prop_assert!(matches_extension(Path::new(&name), &["tif".to_string()]));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn resize_always_hits_target(
        width in 1u32..=300u32,
        height in 1u32..=300u32,
        target_w in 1u32..=200u32,
        target_h in 1u32..=200u32,
        alpha in any::<bool>()
    ) {
        let config = PipelineConfig {
            target_width: target_w,
            target_height: target_h,
            ..PipelineConfig::default()
        };
        let img = if alpha {
            DynamicImage::new_rgba8(width, height)
        } else {
            DynamicImage::new_luma8(width, height)
        };

        let out = ImageTransformer::new(&config).resize_and_flatten(&img);
        prop_assert_eq!(out.dimensions(), (target_w, target_h));
        prop_assert_eq!(out.color(), ColorType::Rgb8);
    }
}
