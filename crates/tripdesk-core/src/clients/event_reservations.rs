use std::sync::Arc;

use tripdesk_api::{Envelope, Method};

use super::some;
use super::tags::{DASHBOARD, EVENT_RESERVATION};
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, EventReservation, ReservationStatus};
use crate::normalize;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("event_reservation", "/event-reservations")
        .operation(
            OperationDef::query("list", "/get")
                .envelope(Envelope::Named("reservations"))
                .provides(TagRule::Kind(EVENT_RESERVATION)),
        )
        .operation(OperationDef::query("get", "/get/{id}").provides(TagRule::Kind(EVENT_RESERVATION)))
        .operation(
            OperationDef::mutation("update_status", Method::Patch, "/status/{id}")
                .invalidates(TagRule::Kind(EVENT_RESERVATION))
                .invalidates(TagRule::Kind(DASHBOARD)),
        )
        .build()
}

#[derive(Debug, Clone)]
pub struct EventReservationsClient {
    resource: ResourceClient,
}

impl EventReservationsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<EventReservation>>, CoreError> {
        self.resource
            .watch_list("list", Params::new(), normalize::event_reservation)
    }

    pub async fn list(&self) -> Result<Arc<Vec<EventReservation>>, CoreError> {
        self.resource
            .list("list", Params::new(), normalize::event_reservation)
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<EventReservation>>, CoreError> {
        self.resource
            .one("get", Params::id(id), normalize::event_reservation)
            .await
    }

    pub async fn update_status(
        &self,
        id: &EntityId,
        status: ReservationStatus,
    ) -> Result<Option<EventReservation>, CoreError> {
        let params = Params::id(id).json(normalize::status_body(status));
        self.resource
            .mutate("update_status", params, some(normalize::event_reservation))
            .await
    }
}
