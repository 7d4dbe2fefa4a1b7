use std::cmp::Ordering;
use std::collections::HashSet;

use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::foods::repo::{self, RecentSearch};
use crate::foods::{local, openfoodfacts::CatalogClient};
use crate::nutrition::record::NutrientRecord;
use crate::state::AppState;

/// Unified food search: curated table first, remote catalog top-up, then one
/// stable ranking pass over the combined list.
pub async fn search_foods(
    state: &AppState,
    user_id: Uuid,
    query: &str,
    limit: usize,
) -> Vec<NutrientRecord> {
    let mut results = gather(&state.catalog, query, limit).await;
    rank(&mut results, query);
    dedupe(&mut results);
    results.truncate(limit);

    // History is best-effort; a dead store must never fail the search.
    if let Err(e) = repo::append_search(&state.db, user_id, query).await {
        warn!(error = %e, %user_id, "failed to record recent search");
    }

    results
}

async fn gather(catalog: &CatalogClient, query: &str, limit: usize) -> Vec<NutrientRecord> {
    let mut results = local::find_matches(query, limit);
    if results.len() < limit {
        results.extend(catalog.search(query, limit).await);
    }
    results
}

/// Total order: keto score desc, data quality desc, name-contains-query
/// desc. The sort is stable, so ties keep their input order (local entries
/// before remote ones).
fn rank(records: &mut [NutrientRecord], query: &str) {
    let needle = query.to_lowercase();
    records.sort_by(|a, b| {
        b.keto_score
            .unwrap_or(0)
            .cmp(&a.keto_score.unwrap_or(0))
            .then(b.data_quality.total_cmp(&a.data_quality))
            .then_with(|| {
                let a_hit = a.name.to_lowercase().contains(&needle);
                let b_hit = b.name.to_lowercase().contains(&needle);
                match (a_hit, b_hit) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                }
            })
    });
}

/// Drops later duplicates of the same product (same barcode, or same
/// name+brand when no barcode). Runs after ranking so the best-ranked copy
/// survives.
fn dedupe(records: &mut Vec<NutrientRecord>) {
    let mut seen = HashSet::new();
    records.retain(|r| {
        let key = match &r.barcode {
            Some(code) => code.clone(),
            None => format!(
                "{}|{}",
                r.name.to_lowercase(),
                r.brand.as_deref().unwrap_or("").to_lowercase()
            ),
        };
        seen.insert(key)
    });
}

/// Barcode lookup goes straight to the remote catalog; the curated table is
/// not consulted.
pub async fn barcode_lookup(state: &AppState, code: &str) -> Option<NutrientRecord> {
    state.catalog.product_by_barcode(code).await
}

// Shown when the history store is unreachable; product-fixed literals.
const FALLBACK_QUERIES: [&str; 3] = ["avocat", "saumon", "œufs"];

pub async fn recent_searches(state: &AppState, user_id: Uuid, limit: i64) -> Vec<RecentSearch> {
    match repo::recent_searches(&state.db, user_id, limit).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, %user_id, "recent searches unavailable, serving defaults");
            let now = OffsetDateTime::now_utc();
            FALLBACK_QUERIES
                .iter()
                .map(|q| RecentSearch {
                    query: (*q).to_string(),
                    searched_at: now,
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::record::{NutrientRecord, Source};

    fn record(name: &str, keto_score: Option<u8>, data_quality: f64) -> NutrientRecord {
        let mut r = NutrientRecord::new(Source::Remote, name.to_lowercase(), name);
        r.keto_score = keto_score;
        r.data_quality = data_quality;
        r
    }

    #[test]
    fn higher_quality_wins_among_equal_scores() {
        let mut records = vec![
            record("Saumon fumé", Some(9), 0.6),
            record("Saumon frais", Some(9), 0.9),
        ];
        rank(&mut records, "saumon");
        assert_eq!(records[0].name, "Saumon frais");
        assert_eq!(records[1].name, "Saumon fumé");
    }

    #[test]
    fn keto_score_dominates_quality() {
        let mut records = vec![
            record("Pain", Some(2), 1.0),
            record("Huile", Some(10), 0.3),
        ];
        rank(&mut records, "x");
        assert_eq!(records[0].name, "Huile");
    }

    #[test]
    fn name_match_breaks_full_ties() {
        let mut records = vec![
            record("Tarte", Some(5), 0.5),
            record("Saumon", Some(5), 0.5),
        ];
        rank(&mut records, "saumon");
        assert_eq!(records[0].name, "Saumon");
    }

    #[test]
    fn unscored_records_sink_to_the_bottom() {
        let mut records = vec![
            record("Inconnu", None, 1.0),
            record("Beurre", Some(10), 0.2),
        ];
        rank(&mut records, "x");
        assert_eq!(records[0].name, "Beurre");
    }

    #[test]
    fn ranking_is_stable_for_exact_ties() {
        let mut records = vec![
            record("Saumon A", Some(9), 0.7),
            record("Saumon B", Some(9), 0.7),
        ];
        rank(&mut records, "saumon");
        assert_eq!(records[0].name, "Saumon A");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut a = record("Saumon", Some(9), 0.9);
        a.barcode = Some("123".into());
        let mut b = record("Saumon sauvage", Some(8), 0.5);
        b.barcode = Some("123".into());
        let c = record("Saumon", Some(7), 0.4); // no barcode, same name
        let d = record("Saumon", Some(6), 0.2); // duplicate of c by name+brand

        let mut records = vec![a, b, c, d];
        dedupe(&mut records);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Saumon", "Saumon"]);
        assert_eq!(records[0].barcode.as_deref(), Some("123"));
        assert_eq!(records[1].barcode, None);
    }
}
