//! Trip and event command handlers.

use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{EntityId, Event, Trip};
use tripdesk_core::requests::{EventInput, TripInput};

use crate::cli::{EventFields, EventsArgs, EventsCommand, GlobalOpts, TripFields, TripsArgs, TripsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct TripRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "Dates")]
    dates: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Type")]
    trip_type: String,
    #[tabled(rename = "Available")]
    available: &'static str,
}

impl From<&Trip> for TripRow {
    fn from(t: &Trip) -> Self {
        Self {
            id: t.id.to_string(),
            destination: t.destination.clone(),
            dates: format!(
                "{} → {}",
                output::opt(t.start_date.as_ref()),
                output::opt(t.end_date.as_ref())
            ),
            price: price_label(t),
            trip_type: t.trip_type.clone(),
            available: output::yes_no(t.is_available),
        }
    }
}

fn price_label(t: &Trip) -> String {
    if t.reduction > 0.0 {
        format!("{:.2} (-{}%)", t.discounted_price(), t.reduction)
    } else {
        format!("{:.2}", t.price)
    }
}

fn trip_detail(t: &Trip) -> Vec<(&'static str, String)> {
    vec![
        ("ID", t.id.to_string()),
        ("Destination", t.destination.clone()),
        ("Description", t.description.clone()),
        ("Start", output::opt(t.start_date.as_ref())),
        ("End", output::opt(t.end_date.as_ref())),
        ("Days", output::opt(t.duration_days().as_ref())),
        ("Price", price_label(t)),
        ("Type", t.trip_type.clone()),
        ("Available", output::yes_no(t.is_available).into()),
        ("Image", output::opt(t.image.as_ref())),
    ]
}

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Active")]
    active: &'static str,
}

impl From<&Event> for EventRow {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.to_string(),
            title: e.title.clone(),
            when: format!("{} {}", output::opt(e.date.as_ref()), e.time).trim().to_owned(),
            location: e.location.clone(),
            price: format!("{:.2}", e.price),
            active: output::yes_no(e.is_active),
        }
    }
}

fn event_detail(e: &Event) -> Vec<(&'static str, String)> {
    vec![
        ("ID", e.id.to_string()),
        ("Title", e.title.clone()),
        ("Description", e.description.clone()),
        ("Location", e.location.clone()),
        ("Date", output::opt(e.date.as_ref())),
        ("Time", e.time.clone()),
        ("Price", format!("{:.2}", e.price)),
        ("Active", output::yes_no(e.is_active).into()),
    ]
}

// ── Input assembly ──────────────────────────────────────────────────

impl TripFields {
    /// Overlay the given flags on `base`.
    fn apply(self, mut base: TripInput) -> Result<TripInput, CliError> {
        if let Some(v) = self.destination {
            base.destination = v;
        }
        if let Some(v) = self.description {
            base.description = v;
        }
        if self.start_date.is_some() {
            base.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            base.end_date = self.end_date;
        }
        if let Some(v) = self.price {
            base.price = v;
        }
        if let Some(v) = self.reduction {
            base.reduction = v;
        }
        if let Some(v) = self.trip_type {
            base.trip_type = v;
        }
        if let Some(v) = self.available {
            base.is_available = v;
        }
        if let Some(image) = util::read_optional_image(self.image.as_deref())? {
            base.image = Some(image);
        }
        Ok(base)
    }
}

fn trip_input_from(t: &Trip) -> TripInput {
    TripInput {
        destination: t.destination.clone(),
        description: t.description.clone(),
        start_date: t.start_date,
        end_date: t.end_date,
        price: t.price,
        reduction: t.reduction,
        is_available: t.is_available,
        trip_type: t.trip_type.clone(),
        image: None,
    }
}

impl EventFields {
    fn apply(self, mut base: EventInput) -> Result<EventInput, CliError> {
        if let Some(v) = self.title {
            base.title = v;
        }
        if let Some(v) = self.description {
            base.description = v;
        }
        if let Some(v) = self.location {
            base.location = v;
        }
        if self.date.is_some() {
            base.date = self.date;
        }
        if let Some(v) = self.time {
            base.time = v;
        }
        if let Some(v) = self.price {
            base.price = v;
        }
        if let Some(v) = self.active {
            base.is_active = v;
        }
        if let Some(image) = util::read_optional_image(self.image.as_deref())? {
            base.image = Some(image);
        }
        Ok(base)
    }
}

fn event_input_from(e: &Event) -> EventInput {
    EventInput {
        title: e.title.clone(),
        description: e.description.clone(),
        location: e.location.clone(),
        date: e.date,
        time: e.time.clone(),
        price: e.price,
        is_active: e.is_active,
        image: None,
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_trips(
    backend: &Backend,
    args: TripsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let trips = backend.trips();
    match args.command {
        TripsCommand::List => {
            let list = trips.list().await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |t| TripRow::from(t),
                |t| t.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        TripsCommand::Get { id } => {
            let id = EntityId::from(id);
            let trip = util::found(&trips.get(&id).await?, "trip", &id, "trips list")?;
            let out = output::render_single(&global.output, &trip, trip_detail, |t| t.id.to_string());
            output::print_output(&out, global.quiet);
        }

        TripsCommand::Create(fields) => {
            let input = fields.apply(TripInput {
                is_available: true,
                ..TripInput::default()
            })?;
            let created = trips.create(&input).await?;
            output::saved("Trip", created.as_ref().map(|t| &t.id), "created", global.quiet);
        }

        TripsCommand::Update { id, fields } => {
            let id = EntityId::from(id);
            let current = util::found(&trips.get(&id).await?, "trip", &id, "trips list")?;
            let input = fields.apply(trip_input_from(&current))?;
            trips.update(&id, &input).await?;
            output::saved("Trip", Some(&id), "updated", global.quiet);
        }

        TripsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete trip {id}?"), global.yes)? {
                return Ok(());
            }
            trips.delete(&EntityId::from(id)).await?;
            output::done("Trip deleted", global.quiet);
        }

        TripsCommand::Toggle { id } => {
            let id = EntityId::from(id);
            match trips.toggle_status(&id).await? {
                Some(trip) => output::done(
                    &format!(
                        "Trip {id} is now {}",
                        if trip.is_available { "available" } else { "unavailable" }
                    ),
                    global.quiet,
                ),
                None => output::done(&format!("Trip {id} toggled"), global.quiet),
            }
        }
    }
    Ok(())
}

pub async fn handle_events(
    backend: &Backend,
    args: EventsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let events = backend.events();
    match args.command {
        EventsCommand::List => {
            let list = events.list().await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |e| EventRow::from(e),
                |e| e.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        EventsCommand::Get { id } => {
            let id = EntityId::from(id);
            let event = util::found(&events.get(&id).await?, "event", &id, "events list")?;
            let out = output::render_single(&global.output, &event, event_detail, |e| e.id.to_string());
            output::print_output(&out, global.quiet);
        }

        EventsCommand::Create(fields) => {
            let input = fields.apply(EventInput {
                is_active: true,
                ..EventInput::default()
            })?;
            let created = events.create(&input).await?;
            output::saved("Event", created.as_ref().map(|e| &e.id), "created", global.quiet);
        }

        EventsCommand::Update { id, fields } => {
            let id = EntityId::from(id);
            let current = util::found(&events.get(&id).await?, "event", &id, "events list")?;
            let input = fields.apply(event_input_from(&current))?;
            events.update(&id, &input).await?;
            output::saved("Event", Some(&id), "updated", global.quiet);
        }

        EventsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete event {id}?"), global.yes)? {
                return Ok(());
            }
            events.delete(&EntityId::from(id)).await?;
            output::done("Event deleted", global.quiet);
        }

        EventsCommand::Activate { id } => {
            let id = EntityId::from(id);
            events.activate(&id).await?;
            output::done(&format!("Event {id} toggled"), global.quiet);
        }
    }
    Ok(())
}
