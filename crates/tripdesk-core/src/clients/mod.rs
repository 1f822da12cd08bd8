// ── Typed resource clients ──
//
// Each client is a descriptor plus thin typed wrappers over the generic
// `ResourceClient`. Inputs are validated before anything is sent.

mod admins;
mod community;
mod dashboard;
mod event_reservations;
mod events;
mod questions;
mod reservations;
mod responses;
mod rewards;
mod surveys;
mod trips;
mod users;

use serde_json::Value;

use crate::normalize::{NormalizeError, Normalizer};

pub use admins::{AdminsClient, LoginSession};
pub use community::CommunityClient;
pub use dashboard::DashboardClient;
pub use event_reservations::EventReservationsClient;
pub use events::EventsClient;
pub use questions::QuestionsClient;
pub use reservations::ReservationsClient;
pub use responses::ResponsesClient;
pub use rewards::RewardsClient;
pub use surveys::SurveysClient;
pub use trips::TripsClient;
pub use users::UsersClient;

pub(crate) use admins::descriptor as admins_descriptor;
pub(crate) use community::descriptor as community_descriptor;
pub(crate) use dashboard::descriptor as dashboard_descriptor;
pub(crate) use event_reservations::descriptor as event_reservations_descriptor;
pub(crate) use events::descriptor as events_descriptor;
pub(crate) use questions::descriptor as questions_descriptor;
pub(crate) use reservations::descriptor as reservations_descriptor;
pub(crate) use responses::descriptor as responses_descriptor;
pub(crate) use rewards::descriptor as rewards_descriptor;
pub(crate) use surveys::descriptor as surveys_descriptor;
pub(crate) use trips::descriptor as trips_descriptor;
pub(crate) use users::descriptor as users_descriptor;

/// Cache tag kinds shared across resources.
pub mod tags {
    pub const TRIP: &str = "Trip";
    pub const EVENT: &str = "Event";
    pub const RESERVATION: &str = "Reservation";
    pub const EVENT_RESERVATION: &str = "EventReservation";
    pub const SURVEY: &str = "Survey";
    pub const QUESTION: &str = "Question";
    pub const RESPONSE: &str = "Response";
    pub const REWARD: &str = "Reward";
    pub const USER: &str = "User";
    pub const ADMIN: &str = "Admin";
    pub const COMMUNITY_POSTS: &str = "CommunityPosts";
    pub const COMMENTS: &str = "Comments";
    pub const DASHBOARD: &str = "Dashboard";
}

/// Lift an entity normalizer into one producing `Some`.
fn some<T>(item: Normalizer<T>) -> impl Fn(&Value) -> Result<Option<T>, NormalizeError> + Send + Sync + 'static
where
    T: 'static,
{
    move |payload| item(payload).map(Some)
}
