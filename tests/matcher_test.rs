//! Tests for dictionary matching: tokenization, table priority, confidence
//! and complexity detection.

use shotterms::matcher::{match_terms, synonyms};
use shotterms::{
    AngleDirection, AngleHeight, Field, LensType, Lighting, Perspective, ShotSize, Term,
};

#[test]
fn term_list_matches_fully() {
    let outcome = match_terms("中景,轻微俯拍,3/4正面");

    assert_eq!(outcome.terms.shot_size, Some(ShotSize::MediumShot));
    assert_eq!(outcome.terms.angle_height, Some(AngleHeight::MildHigh));
    assert_eq!(
        outcome.terms.angle_direction,
        Some(AngleDirection::ThreeQuarterFront)
    );
    assert_eq!(outcome.terms.description, None);
    assert_eq!(outcome.matched_tokens, 3);
    assert_eq!(outcome.total_tokens, 3);
    assert_eq!(outcome.confidence(), 1.0);
    assert!(!outcome.is_complex);
}

#[test]
fn narrative_sentence_is_complex() {
    let outcome = match_terms("人物站在街道中央看向远方");

    assert_eq!(outcome.matched_tokens, 0);
    assert_eq!(outcome.total_tokens, 1);
    assert_eq!(outcome.confidence(), 0.0);
    assert!(outcome.is_complex);
    assert_eq!(
        outcome.terms.description.as_deref(),
        Some("人物站在街道中央看向远方")
    );
}

#[test]
fn unmatched_tokens_join_in_order_with_fullwidth_comma() {
    let outcome = match_terms("雨夜, 中景, 霓虹灯");

    assert_eq!(outcome.terms.shot_size, Some(ShotSize::MediumShot));
    assert_eq!(outcome.terms.description.as_deref(), Some("雨夜，霓虹灯"));
    assert_eq!(outcome.matched_tokens, 1);
    assert_eq!(outcome.total_tokens, 3);
}

#[test]
fn every_separator_splits() {
    let outcome = match_terms("中景，逆光、广角;鸟瞰；背面|过肩。特写\n侧光");
    assert_eq!(outcome.total_tokens, 8);
    // 特写 and 侧光 land on fields that are already claimed
    assert_eq!(outcome.matched_tokens, 8);
    assert_eq!(outcome.terms.shot_size, Some(ShotSize::MediumShot));
    assert_eq!(outcome.terms.lighting, Some(Lighting::Backlight));
    assert_eq!(outcome.terms.lens_type, Some(LensType::Wide));
    assert_eq!(outcome.terms.angle_height, Some(AngleHeight::BirdsEye));
    assert_eq!(outcome.terms.angle_direction, Some(AngleDirection::Back));
    assert_eq!(outcome.terms.perspective, Some(Perspective::OverTheShoulder));
}

#[test]
fn first_match_claims_the_field() {
    let outcome = match_terms("中景, 特写, 雨夜");

    assert_eq!(outcome.terms.shot_size, Some(ShotSize::MediumShot));
    // the second shot size counts as matched but is not kept anywhere
    assert_eq!(outcome.matched_tokens, 2);
    assert_eq!(outcome.terms.description.as_deref(), Some("雨夜"));
    assert!((outcome.confidence() - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn lookup_is_case_insensitive_and_whitespace_tolerant() {
    let outcome = match_terms("  Medium   Shot ,LOW ANGLE, Golden Hour ");

    assert_eq!(outcome.terms.shot_size, Some(ShotSize::MediumShot));
    assert_eq!(outcome.terms.angle_height, Some(AngleHeight::Low));
    assert_eq!(outcome.terms.lighting, Some(Lighting::GoldenHour));
    assert_eq!(outcome.confidence(), 1.0);
}

#[test]
fn wide_resolves_to_shot_size_before_lens_type() {
    let outcome = match_terms("wide");
    assert_eq!(outcome.terms.shot_size, Some(ShotSize::LongShot));
    assert_eq!(outcome.terms.lens_type, None);

    // lens type is reachable through its unambiguous synonyms
    let outcome = match_terms("wide angle");
    assert_eq!(outcome.terms.lens_type, Some(LensType::Wide));
}

#[test]
fn side_resolves_to_angle_direction_before_lighting() {
    let outcome = match_terms("side");
    assert_eq!(outcome.terms.angle_direction, Some(AngleDirection::Profile));
    assert_eq!(outcome.terms.lighting, None);

    let outcome = match_terms("side light");
    assert_eq!(outcome.terms.lighting, Some(Lighting::SideLight));
}

#[test]
fn colliding_token_does_not_fall_through_when_field_taken() {
    // shot size is already claimed; "wide" still belongs to the shot size table
    let outcome = match_terms("特写, wide");
    assert_eq!(outcome.terms.shot_size, Some(ShotSize::CloseUp));
    assert_eq!(outcome.terms.lens_type, None);
    assert_eq!(outcome.matched_tokens, 2);
}

#[test]
fn empty_input_has_zero_confidence() {
    let outcome = match_terms("  ,, \n ");
    assert_eq!(outcome.total_tokens, 0);
    assert_eq!(outcome.matched_tokens, 0);
    assert_eq!(outcome.confidence(), 0.0);
    assert!(outcome.is_complex);
    assert_eq!(outcome.terms.description, None);
}

#[test]
fn english_marker_with_single_match_is_complex() {
    let outcome = match_terms("the camera, close up");
    assert_eq!(outcome.matched_tokens, 1);
    assert_eq!(outcome.confidence(), 0.5);
    assert!(outcome.is_complex);
}

#[test]
fn marker_with_two_matches_is_not_complex() {
    let outcome = match_terms("镜头, 特写, 逆光");
    assert_eq!(outcome.matched_tokens, 2);
    assert!(!outcome.is_complex);
}

#[test]
fn long_unmatched_input_is_complex() {
    let outcome = match_terms("a quiet empty street at dawn");
    assert_eq!(outcome.matched_tokens, 0);
    assert!(outcome.is_complex);
}

#[test]
fn matching_is_deterministic() {
    let a = match_terms("中景, 逆光, 雨夜, 霓虹");
    let b = match_terms("中景, 逆光, 雨夜, 霓虹");
    assert_eq!(a, b);
}

#[test]
fn every_label_and_synonym_resolves_in_its_own_table() {
    for field in Field::PRIORITY {
        for term in Term::all_of(field) {
            for synonym in term.synonyms() {
                let resolved = synonyms::resolve(field, synonym);
                // the first term listing a synonym owns it within a table
                assert!(
                    resolved.is_some_and(|r| r.field() == field),
                    "{synonym} did not resolve in {field}"
                );
            }
            assert_eq!(synonyms::resolve(field, term.label()), Some(term));
        }
    }
}

#[test]
fn only_known_collisions_cross_tables() {
    let mut collisions = Vec::new();
    let tables = synonyms::tables();
    for (i, earlier) in tables.iter().enumerate() {
        for later in &tables[i + 1..] {
            for term in Term::all_of(later.field()) {
                for synonym in term.synonyms() {
                    if earlier.lookup(&synonym.to_lowercase()).is_some() {
                        collisions.push(synonym.to_lowercase());
                    }
                }
            }
        }
    }
    collisions.sort();
    collisions.dedup();
    assert_eq!(collisions, vec!["side".to_string(), "wide".to_string()]);
}
