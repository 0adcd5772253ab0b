//! Order-invariance property of the substance set aggregator.

use proptest::prelude::{Just, Strategy, prop, proptest};

use ccdd_core::build_substance_sets;
use ccdd_model::ProductIngredient;

fn ingredient(precise: &str, basis: &str, strength: &str) -> ProductIngredient {
    ProductIngredient {
        drug_code: "1".to_string(),
        ingredient_code: "I".to_string(),
        basis_of_strength_name: basis.to_string(),
        precise_name: precise.to_string(),
        moiety_name: basis.to_string(),
        strength: strength.to_string(),
        strength_unit: "MG".to_string(),
        dosage_value: String::new(),
        dosage_unit: String::new(),
    }
}

fn arb_ingredient() -> impl Strategy<Value = ProductIngredient> {
    let names = prop::sample::select(vec![
        ("ACETAMINOPHEN", "ACETAMINOPHEN"),
        ("CAFFEINE", "CAFFEINE"),
        ("CODEINE PHOSPHATE", "CODEINE"),
        ("IBUPROFEN SODIUM", "IBUPROFEN"),
        ("NAPROXEN", "NAPROXEN"),
    ]);
    let strengths = prop::sample::select(vec!["8", "15", "200", "300", "500"]);
    (names, strengths).prop_map(|((precise, basis), strength)| ingredient(precise, basis, strength))
}

proptest! {
    #[test]
    fn set_keys_are_invariant_under_row_permutation(
        (original, shuffled) in prop::collection::vec(arb_ingredient(), 1..8)
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
    ) {
        let base = build_substance_sets(&original);
        let permuted = build_substance_sets(&shuffled);
        assert_eq!(base, permuted);
        assert_eq!(base.substance_key(), permuted.substance_key());
        assert_eq!(base.strength_dosage_key(), permuted.strength_dosage_key());
        assert_eq!(base.moiety_key(), permuted.moiety_key());
        assert_eq!(base.display_key(), permuted.display_key());
    }

    #[test]
    fn duplicated_rows_do_not_change_keys(
        rows in prop::collection::vec(arb_ingredient(), 1..5)
    ) {
        let mut doubled = rows.clone();
        doubled.extend(rows.iter().cloned());
        assert_eq!(build_substance_sets(&rows), build_substance_sets(&doubled));
    }
}
