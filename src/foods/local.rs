use lazy_static::lazy_static;

use crate::nutrition::record::{NutrientRecord, Source};

// Curated keto staples, per 100 g. First-hit source for search; values come
// from the CIQUAL composition tables rounded to one decimal.
const TABLE: &[(&str, &str, &str, f64, f64, f64, f64, f64)] = &[
    // (id, name, category, kcal, protein, carbs, fat, fiber)
    ("local-avocat", "Avocat", "Fruits", 160.0, 2.0, 8.5, 14.7, 6.7),
    ("local-saumon", "Saumon", "Poissons", 208.0, 20.0, 0.0, 13.0, 0.0),
    ("local-saumon-fume", "Saumon fumé", "Poissons", 117.0, 18.0, 0.0, 4.3, 0.0),
    ("local-thon", "Thon au naturel", "Poissons", 132.0, 28.0, 0.0, 1.3, 0.0),
    ("local-oeuf", "Œuf", "Œufs", 155.0, 13.0, 1.1, 11.0, 0.0),
    ("local-beurre", "Beurre doux", "Matières grasses", 717.0, 0.9, 0.1, 81.0, 0.0),
    ("local-huile-olive", "Huile d'olive", "Matières grasses", 884.0, 0.0, 0.0, 100.0, 0.0),
    ("local-mayonnaise", "Mayonnaise", "Matières grasses", 680.0, 1.0, 0.6, 75.0, 0.0),
    ("local-cheddar", "Cheddar", "Fromages", 402.0, 25.0, 1.3, 33.0, 0.0),
    ("local-camembert", "Camembert", "Fromages", 300.0, 20.0, 0.5, 24.0, 0.0),
    ("local-mozzarella", "Mozzarella", "Fromages", 280.0, 28.0, 3.1, 17.0, 0.0),
    ("local-creme-fraiche", "Crème fraîche", "Crèmerie", 292.0, 2.4, 2.9, 30.0, 0.0),
    ("local-amandes", "Amandes", "Fruits à coque", 579.0, 21.0, 22.0, 50.0, 12.5),
    ("local-noix", "Noix", "Fruits à coque", 654.0, 15.0, 14.0, 65.0, 6.7),
    ("local-olives", "Olives vertes", "Fruits", 145.0, 1.0, 3.8, 15.0, 3.3),
    ("local-epinards", "Épinards", "Légumes", 23.0, 2.9, 3.6, 0.4, 2.2),
    ("local-brocoli", "Brocoli", "Légumes", 34.0, 2.8, 7.0, 0.4, 2.6),
    ("local-chou-fleur", "Chou-fleur", "Légumes", 25.0, 1.9, 5.0, 0.3, 2.0),
    ("local-courgette", "Courgette", "Légumes", 17.0, 1.2, 3.1, 0.3, 1.0),
    ("local-poulet", "Blanc de poulet", "Viandes", 165.0, 31.0, 0.0, 3.6, 0.0),
    ("local-boeuf-hache", "Bœuf haché 20%", "Viandes", 254.0, 17.0, 0.0, 20.0, 0.0),
    ("local-lardons", "Lardons fumés", "Charcuterie", 541.0, 37.0, 1.4, 42.0, 0.0),
];

lazy_static! {
    /// Immutable process-wide food table, scored once at startup.
    pub static ref LOCAL_FOODS: Vec<NutrientRecord> = TABLE
        .iter()
        .map(|&(id, name, category, calories, protein, carbs, fat, fiber)| {
            let mut r = NutrientRecord::new(Source::Local, id, name);
            r.categories = vec![category.to_string()];
            r.calories = Some(calories);
            r.protein = Some(protein);
            r.carbohydrates = Some(carbs);
            r.fat = Some(fat);
            r.fiber = Some(fiber);
            r.finalize()
        })
        .collect();
}

/// Case-insensitive containment match over name, category and brand,
/// preserving table order.
pub fn find_matches(query: &str, limit: usize) -> Vec<NutrientRecord> {
    let needle = query.to_lowercase();
    LOCAL_FOODS
        .iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.categories.iter().any(|c| c.to_lowercase().contains(&needle))
                || r.brand
                    .as_deref()
                    .map_or(false, |b| b.to_lowercase().contains(&needle))
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Sorted, distinct category names across the table.
pub fn categories() -> Vec<String> {
    let mut out: Vec<String> = LOCAL_FOODS
        .iter()
        .flat_map(|r| r.categories.iter().cloned())
        .collect();
    out.sort();
    out.dedup();
    out
}
