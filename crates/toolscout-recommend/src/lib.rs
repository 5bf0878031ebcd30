//! Tool recommendation for toolscout.
//!
//! Given a free-text request, a [`Recommender`] ranks the locally discovered
//! tools, decides whether the best one can be adapted, and optionally picks a
//! matching tool from the external catalog. [`RecommendationService`] wires
//! these steps together and shapes the reply.

pub mod error;
pub mod gemini;
pub mod prompts;
pub mod recommender;
pub mod service;

pub use error::{RecommendError, Result};
pub use gemini::GeminiRecommender;
pub use recommender::{Recommender, UpdateAssessment};
pub use service::{
    CatalogToolMatch, CodeToolMatch, RecommendationResponse, RecommendationService,
    NO_TOOLS_MESSAGE,
};
