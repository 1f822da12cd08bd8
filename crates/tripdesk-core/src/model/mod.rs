// ── Domain model ──
//
// Stable frontend shapes. Only `crate::normalize` knows the backend
// field names these are built from.

pub mod community;
pub mod dashboard;
pub mod entity_id;
pub mod reservation;
pub mod reward;
pub mod survey;
pub mod trip;
pub mod user;

pub use community::{Author, Comment, CommunityPost, LikeResult};
pub use dashboard::{
    Bucket, Counters, Engagement, MonthlyCount, RevenuePoint, Series, TopUser, TripStats,
    UserStats,
};
pub use entity_id::EntityId;
pub use reservation::{Customer, EventReservation, ReservationStatus, TripReservation, TripSummary};
pub use reward::{DISCOUNT_CATEGORY, GIFT_CATEGORY, Reward};
pub use survey::{
    Question, QuestionType, RespondentProfile, Response, Survey, SurveyAnswer, SurveyQuestion,
    SurveyResponse, SurveyStatus,
};
pub use trip::{Event, Trip};
pub use user::{Acknowledgement, Admin, LoginOutcome, User};
