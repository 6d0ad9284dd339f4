mod case;
mod feedback;
mod room;

pub use case::{
    CaseRecord, ConfirmedFeature, FeatureDetection, ImageRecord, Pass1Result, RoomRecord,
};
pub use feedback::{
    Classification, FeedbackEntry, FeedbackKey, FeedbackKind, FeedbackRequest, ResolvedFeedback,
    ResolvedVerdict, Verdict,
};
pub use room::{FeatureId, RoomType, Severity, FEATURE_WHITELIST};
