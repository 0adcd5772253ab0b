//! Substance set aggregation.
//!
//! Each product's canonical ingredients are sorted by
//! (precise name, basis name, strength text) and reduced to ordered,
//! deduplicated element sequences. Because the element order is fully
//! determined by the sort, any permutation of the input rows yields
//! byte-identical serialized keys, which is what makes grouping by the key
//! string equivalent to grouping by the semantic set.

use ccdd_model::{ProductIngredient, SubstanceSets};

fn push_distinct(elements: &mut Vec<String>, value: String) {
    if value.is_empty() {
        return;
    }
    if !elements.iter().any(|existing| *existing == value) {
        elements.push(value);
    }
}

/// Display element pairing the basis name with the precise name (only when
/// they differ) and the strength text.
pub fn display_element(ingredient: &ProductIngredient) -> String {
    let strength = ingredient.strength_text();
    let name = if ingredient.precise_name != ingredient.basis_of_strength_name {
        format!(
            "{} ({})",
            ingredient.basis_of_strength_name, ingredient.precise_name
        )
    } else {
        ingredient.basis_of_strength_name.clone()
    };
    if strength.is_empty() {
        name
    } else {
        format!("{name} {strength}")
    }
}

fn strength_dosage_element(ingredient: &ProductIngredient) -> String {
    let strength = ingredient.strength_text();
    if strength.is_empty() {
        ingredient.precise_name.clone()
    } else {
        format!("{} {strength}", ingredient.precise_name)
    }
}

/// Build the four parallel set-keys plus the display key for one product's
/// canonical ingredients.
pub fn build_substance_sets(ingredients: &[ProductIngredient]) -> SubstanceSets {
    let mut sorted: Vec<&ProductIngredient> = ingredients.iter().collect();
    sorted.sort_by_cached_key(|ingredient| {
        (
            ingredient.precise_name.clone(),
            ingredient.basis_of_strength_name.clone(),
            ingredient.strength_text(),
        )
    });

    let mut sets = SubstanceSets::default();
    for ingredient in sorted {
        push_distinct(&mut sets.substance, ingredient.precise_name.clone());
        push_distinct(&mut sets.basis, ingredient.basis_of_strength_name.clone());
        push_distinct(&mut sets.moiety, ingredient.moiety_name.clone());
        push_distinct(&mut sets.strength_dosage, strength_dosage_element(ingredient));
        push_distinct(&mut sets.display, display_element(ingredient));
    }
    sets
}
