use std::sync::Arc;

use tripdesk_api::{AuthScope, Envelope, Method};

use super::some;
use super::tags::{DASHBOARD, RESERVATION};
use crate::cache::QuerySubscription;
use crate::error::CoreError;
use crate::model::{EntityId, ReservationStatus, TripReservation};
use crate::normalize;
use crate::resource::{OperationDef, Params, ResourceClient, ResourceDescriptor, TagRule};

const LIST: Envelope = Envelope::Named("reservations");
const ONE: Envelope = Envelope::Named("reservation");

pub(crate) fn descriptor() -> Result<ResourceDescriptor, CoreError> {
    ResourceDescriptor::new("reservation", "/reservation")
        .auth(AuthScope::Admin)
        .operation(
            OperationDef::query("list", "/get")
                .envelope(LIST)
                .provides(TagRule::Kind(RESERVATION)),
        )
        .operation(
            OperationDef::query("list_by_status", "/reservations/status/{status}")
                .envelope(LIST)
                .provides(TagRule::Kind(RESERVATION)),
        )
        .operation(
            OperationDef::query("get", "/get/{id}")
                .envelope(ONE)
                .provides(TagRule::Kind(RESERVATION)),
        )
        .operation(
            OperationDef::mutation("update_status", Method::Put, "/status/{id}")
                .envelope(ONE)
                .invalidates(TagRule::Kind(RESERVATION))
                .invalidates(TagRule::Kind(DASHBOARD)),
        )
        .build()
}

/// Trip reservations. Admin credential only.
#[derive(Debug, Clone)]
pub struct ReservationsClient {
    resource: ResourceClient,
}

impl ReservationsClient {
    pub(crate) fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    pub fn watch_list(&self) -> Result<QuerySubscription<Vec<TripReservation>>, CoreError> {
        self.resource
            .watch_list("list", Params::new(), normalize::trip_reservation)
    }

    pub async fn list(&self) -> Result<Arc<Vec<TripReservation>>, CoreError> {
        self.resource
            .list("list", Params::new(), normalize::trip_reservation)
            .await
    }

    pub async fn list_by_status(&self, status: ReservationStatus) -> Result<Arc<Vec<TripReservation>>, CoreError> {
        let params = Params::new().path("status", status.to_string());
        self.resource
            .list("list_by_status", params, normalize::trip_reservation)
            .await
    }

    pub async fn get(&self, id: &EntityId) -> Result<Arc<Option<TripReservation>>, CoreError> {
        self.resource
            .one("get", Params::id(id), normalize::trip_reservation)
            .await
    }

    pub async fn update_status(
        &self,
        id: &EntityId,
        status: ReservationStatus,
    ) -> Result<Option<TripReservation>, CoreError> {
        let params = Params::id(id).json(normalize::status_body(status));
        self.resource
            .mutate("update_status", params, some(normalize::trip_reservation))
            .await
    }
}
