//! End-to-end menu pipeline: photo in, ranked recommendations out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::MenuError;
use crate::menu::MenuItem;
use crate::profile::UserProfile;
use crate::recommend::{Explanation, RecommendationSelector};
use crate::vision::VisionExtractionClient;

/// How extracted items are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Deterministic local scoring.
    #[default]
    Local,
    /// Model-assisted ranking, falling back to local scoring on failure.
    Model,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendOptions {
    pub mode: RankingMode,
    pub explain: bool,
}

/// One recommended dish with its request-scoped fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub item: MenuItem,
    pub match_score: f64,
    pub spice_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drink_pairing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

impl Recommendation {
    fn new(item: MenuItem, match_score: f64) -> Self {
        let spice_level = item.spice_level();
        Self {
            item,
            match_score,
            spice_level,
            reasoning: None,
            drink_pairing: None,
            explanation: None,
        }
    }
}

/// Feedback on a past recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishFeedback {
    pub item_id: uuid::Uuid,
    pub liked: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

pub struct MenuPipeline {
    client: Arc<VisionExtractionClient>,
    selector: RecommendationSelector,
}

impl MenuPipeline {
    pub fn new(client: Arc<VisionExtractionClient>, selector: RecommendationSelector) -> Self {
        Self { client, selector }
    }

    pub fn client(&self) -> &Arc<VisionExtractionClient> {
        &self.client
    }

    /// Extract the menu from `image`, then rank it for `profile`.
    pub async fn recommend(
        &self,
        image: &[u8],
        profile: &UserProfile,
        options: RecommendOptions,
    ) -> Result<Vec<Recommendation>, MenuError> {
        let items = self.client.extract_menu_items(image).await?;
        self.rank(items, profile, options).await
    }

    /// Rank already-extracted items. Model mode only ever sees dietary-safe
    /// candidates, and any model failure other than the budget or a
    /// cancellation falls back to local scoring.
    pub async fn rank(
        &self,
        items: Vec<MenuItem>,
        profile: &UserProfile,
        options: RecommendOptions,
    ) -> Result<Vec<Recommendation>, MenuError> {
        let candidates = self
            .selector
            .filter()
            .filter(items, &profile.dietary_tags);
        let selector = self.selector.for_candidates(&candidates);

        let mut recommendations = match options.mode {
            RankingMode::Local => rank_locally(&selector, candidates, profile),
            RankingMode::Model => match self.client.rank_menu_items(&candidates, profile).await {
                Ok(ranked) if !ranked.is_empty() => ranked
                    .into_iter()
                    .map(|ranked| {
                        let mut rec = Recommendation::new(ranked.item, ranked.score);
                        rec.reasoning = Some(ranked.reasoning).filter(|r| !r.is_empty());
                        rec.drink_pairing = ranked.drink_pairing;
                        rec
                    })
                    .collect(),
                Ok(_) => {
                    if !candidates.is_empty() {
                        tracing::warn!("Model ranking resolved no items; using local scoring");
                    }
                    rank_locally(&selector, candidates, profile)
                }
                Err(e @ (MenuError::DailyCostExceeded { .. } | MenuError::Cancelled)) => {
                    return Err(e)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Model ranking failed; using local scoring");
                    rank_locally(&selector, candidates, profile)
                }
            },
        };

        if options.explain {
            for rec in &mut recommendations {
                rec.explanation = Some(selector.explain(&rec.item, rec.match_score, profile));
            }
        }
        Ok(recommendations)
    }

    /// Accepted and ignored; taste profiles are not updated from feedback.
    pub fn analyze_feedback(&self, profile: &UserProfile, feedback: &[DishFeedback]) {
        tracing::debug!(
            profile_id = %profile.id,
            entries = feedback.len(),
            "Feedback received; no profile update performed"
        );
    }
}

fn rank_locally(
    selector: &RecommendationSelector,
    candidates: Vec<MenuItem>,
    profile: &UserProfile,
) -> Vec<Recommendation> {
    selector
        .select(candidates, profile)
        .into_iter()
        .map(|scored| Recommendation::new(scored.item, scored.score))
        .collect()
}
