//! Model recommendation.

use crate::models::{ModelCatalog, Recommendation, WeightVector};

/// Ranks the catalog against `weights` and picks the top model.
///
/// Returns `None` only for an empty catalog.
#[must_use]
pub fn recommend(catalog: &ModelCatalog, weights: &WeightVector) -> Option<Recommendation> {
    let ranked = catalog.rank(weights);
    let recommendation = ranked.first()?.clone();

    metrics::counter!("promptops_recommendations_total").increment(1);
    tracing::debug!(
        model = %recommendation.model,
        score = recommendation.score,
        "Recommended model"
    );

    Some(Recommendation {
        recommendation,
        ranked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelProfile;
    use test_case::test_case;

    #[test_case(WeightVector::new(5.0, 3.0, 3.0, 4.0, 2.0), "gpt-4o-mini" ; "balanced")]
    #[test_case(WeightVector::new(1.0, 0.0, 0.0, 1.0, 1.0), "gpt-4o" ; "quality and breadth")]
    #[test_case(WeightVector::new(0.0, 1.0, 1.0, 0.0, 0.0), "gpt-4o-mini" ; "fast and cheap")]
    #[test_case(WeightVector::new(0.0, 0.0, -1.0, 0.0, 0.0), "gpt-4o" ; "negative cost weight")]
    #[test_case(WeightVector::default(), "gpt-4o" ; "all zero ties break by catalog order")]
    fn test_recommend_top_model(weights: WeightVector, expected: &str) {
        let result = recommend(&ModelCatalog::builtin(), &weights).unwrap();
        assert_eq!(result.recommendation.model, expected);
        assert_eq!(result.recommendation, result.ranked[0]);
    }

    #[test]
    fn test_scenario_scores() {
        let result = recommend(
            &ModelCatalog::builtin(),
            &WeightVector::new(5.0, 3.0, 3.0, 4.0, 2.0),
        )
        .unwrap();
        let pairs: Vec<_> = result
            .ranked
            .iter()
            .map(|r| (r.model.as_str(), r.score))
            .collect();
        assert_eq!(
            pairs,
            [("gpt-4o-mini", 74.0), ("gpt-4o", 70.0), ("o3-mini", 62.0)]
        );
    }

    #[test]
    fn test_empty_catalog_has_no_recommendation() {
        static EMPTY: &[ModelProfile] = &[];
        let catalog = ModelCatalog::from_static(EMPTY);
        assert!(recommend(&catalog, &WeightVector::default()).is_none());
    }

    #[test]
    fn test_tie_uses_declaration_order_not_input_order() {
        static TIED: &[ModelProfile] = &[
            ModelProfile {
                id: "b",
                quality: 3,
                latency: 1,
                cost: 1,
                context: 1,
                multimodal: 1,
            },
            ModelProfile {
                id: "a",
                quality: 3,
                latency: 2,
                cost: 1,
                context: 1,
                multimodal: 1,
            },
        ];
        let result = recommend(
            &ModelCatalog::from_static(TIED),
            &WeightVector::new(1.0, 0.0, 0.0, 0.0, 0.0),
        )
        .unwrap();
        assert_eq!(result.recommendation.model, "b");
    }
}
