// * Content-addressed cache keys
// * Key = xxh64 over a canonical string of the fields that shape a component

use crate::models::{ComponentType, DiscoveryResult, PersonalizationContext};
use xxhash_rust::xxh64::xxh64;

// * Separate seeds keep the sub-fingerprints independent of the outer hash
const INTEREST_SEED: u64 = 0x1;
const DISCOVERY_SEED: u64 = 0x2;
const KEY_SEED: u64 = 0;

/// Fingerprint of the interest vector; stable because the map is ordered
pub fn interests_fingerprint(context: &PersonalizationContext) -> u64 {
    let canonical = context
        .user_interests
        .iter()
        .map(|(topic, score)| format!("{}={}", topic, score))
        .collect::<Vec<_>>()
        .join(";");
    xxh64(canonical.as_bytes(), INTEREST_SEED)
}

/// Fingerprint of the first `depth` discovery results
pub fn discovery_fingerprint(results: &[DiscoveryResult], depth: usize) -> u64 {
    let canonical = results
        .iter()
        .take(depth)
        .map(|r| {
            format!(
                "t:{}|u:{}|e:{}|c:{}|s:{}|g:{}",
                r.title,
                r.url,
                r.excerpt,
                r.category,
                r.relevance_score,
                r.tags.join(",")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    xxh64(canonical.as_bytes(), DISCOVERY_SEED)
}

/// Deterministic key for one component of one request shape
///
/// Only the component type, query, primary intent, interests and the
/// first `depth` discovery results contribute; tone, timestamps and
/// the rest of the context do not.
pub fn compute_cache_key(
    component_type: ComponentType,
    context: &PersonalizationContext,
    discovery_results: &[DiscoveryResult],
    depth: usize,
) -> String {
    let canonical = format!(
        "ct:{};q:{};pi:{};ui:{:016x};dr:{:016x}",
        component_type.as_str(),
        context.search_query,
        context.primary_intent().as_str(),
        interests_fingerprint(context),
        discovery_fingerprint(discovery_results, depth)
    );
    format!(
        "{}:{:016x}",
        component_type.as_str(),
        xxh64(canonical.as_bytes(), KEY_SEED)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Intent, IntentAnalysis, Tone};
    use std::collections::BTreeMap;

    fn context(query: &str) -> PersonalizationContext {
        PersonalizationContext::new(query, IntentAnalysis::new(Intent::Commercial, 0.8, vec![]))
    }

    fn results(n: usize) -> Vec<DiscoveryResult> {
        (0..n)
            .map(|i| DiscoveryResult::new(&format!("Result {}", i), &format!("https://x.y/{}", i), 0.5))
            .collect()
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = compute_cache_key(ComponentType::Hero, &context("tile"), &results(3), 5);
        let b = compute_cache_key(ComponentType::Hero, &context("tile"), &results(3), 5);
        assert_eq!(a, b);
        assert!(a.starts_with("hero:"));
    }

    #[test]
    fn test_key_ignores_interest_insertion_order() {
        let mut first = BTreeMap::new();
        first.insert("home".to_string(), 0.8);
        first.insert("diy".to_string(), 0.3);
        let mut second = BTreeMap::new();
        second.insert("diy".to_string(), 0.3);
        second.insert("home".to_string(), 0.8);

        let a = compute_cache_key(ComponentType::Cta, &context("tile").with_interests(first), &[], 5);
        let b = compute_cache_key(ComponentType::Cta, &context("tile").with_interests(second), &[], 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_ignores_results_past_depth_and_tone() {
        let mut longer = results(5);
        longer.push(DiscoveryResult::new("Extra", "https://x.y/extra", 0.9));

        let a = compute_cache_key(ComponentType::Article, &context("tile"), &results(5), 5);
        let b = compute_cache_key(
            ComponentType::Article,
            &context("tile").with_tone(Tone::Friendly),
            &longer,
            5,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_varies_by_type_and_query() {
        let hero = compute_cache_key(ComponentType::Hero, &context("tile"), &[], 5);
        let cta = compute_cache_key(ComponentType::Cta, &context("tile"), &[], 5);
        let other = compute_cache_key(ComponentType::Hero, &context("grout"), &[], 5);
        assert_ne!(hero, cta);
        assert_ne!(hero, other);
    }
}
