//! Trip and event reservation command handlers.

use tabled::Tabled;

use tripdesk_core::Backend;
use tripdesk_core::model::{EntityId, EventReservation, TripReservation};

use crate::cli::{
    EventReservationsArgs, EventReservationsCommand, GlobalOpts, ReservationsArgs,
    ReservationsCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct TripReservationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Trip")]
    trip: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "People")]
    people: u64,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl TripReservationRow {
    fn new(r: &TripReservation, color: bool) -> Self {
        Self {
            id: r.id.to_string(),
            trip: r.trip.destination.clone(),
            customer: format!("{} {}", r.customer.name, r.customer.lastname).trim().to_owned(),
            people: r.number_of_people,
            total: format!("{:.2}", r.total_price),
            status: output::status_label(r.status, color),
        }
    }
}

fn trip_reservation_detail(r: &TripReservation) -> Vec<(&'static str, String)> {
    vec![
        ("ID", r.id.to_string()),
        ("Trip", format!("{} ({})", r.trip.destination, r.trip.id)),
        ("Customer", format!("{} {}", r.customer.name, r.customer.lastname)),
        ("Email", r.customer.email.clone()),
        ("People", r.number_of_people.to_string()),
        ("Total", format!("{:.2}", r.total_price)),
        ("Payment", r.payment_method.clone()),
        ("Status", r.status.to_string()),
        ("Notes", r.notes.clone()),
        ("Booked", output::opt(r.created_at.as_ref())),
    ]
}

#[derive(Tabled)]
struct EventReservationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Persons")]
    persons: u64,
    #[tabled(rename = "Status")]
    status: String,
}

impl EventReservationRow {
    fn new(r: &EventReservation, color: bool) -> Self {
        Self {
            id: r.id.to_string(),
            event: r.event_name.clone(),
            client: format!("{} {}", r.client_first_name, r.client_last_name).trim().to_owned(),
            date: output::opt(r.reservation_date.as_ref()),
            persons: r.persons,
            status: output::status_label(r.status, color),
        }
    }
}

fn event_reservation_detail(r: &EventReservation) -> Vec<(&'static str, String)> {
    vec![
        ("ID", r.id.to_string()),
        ("Event", r.event_name.clone()),
        ("Client", format!("{} {}", r.client_first_name, r.client_last_name)),
        ("Date", output::opt(r.reservation_date.as_ref())),
        ("Persons", r.persons.to_string()),
        ("Total", format!("{:.2}", r.total_price)),
        ("Payment", r.payment_method.clone()),
        ("Status", r.status.to_string()),
        ("Notes", r.notes.clone()),
    ]
}

pub async fn handle_trips(
    backend: &Backend,
    args: ReservationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reservations = backend.reservations();
    let color = output::should_color(&global.color_mode());
    match args.command {
        ReservationsCommand::List { status } => {
            let list = match status {
                Some(status) => reservations.list_by_status(status).await?,
                None => reservations.list().await?,
            };
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |r| TripReservationRow::new(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        ReservationsCommand::Get { id } => {
            let id = EntityId::from(id);
            let reservation = util::found(
                &reservations.get(&id).await?,
                "reservation",
                &id,
                "reservations list",
            )?;
            let out = output::render_single(
                &global.output,
                &reservation,
                trip_reservation_detail,
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        ReservationsCommand::SetStatus { id, status } => {
            let id = EntityId::from(id);
            reservations.update_status(&id, status).await?;
            output::done(&format!("Reservation {id} is now {status}"), global.quiet);
        }
    }
    Ok(())
}

pub async fn handle_events(
    backend: &Backend,
    args: EventReservationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reservations = backend.event_reservations();
    let color = output::should_color(&global.color_mode());
    match args.command {
        EventReservationsCommand::List => {
            let list = reservations.list().await?;
            let out = output::render_list(
                &global.output,
                list.as_slice(),
                |r| EventReservationRow::new(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        EventReservationsCommand::Get { id } => {
            let id = EntityId::from(id);
            let reservation = util::found(
                &reservations.get(&id).await?,
                "event reservation",
                &id,
                "event-reservations list",
            )?;
            let out = output::render_single(
                &global.output,
                &reservation,
                event_reservation_detail,
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        EventReservationsCommand::SetStatus { id, status } => {
            let id = EntityId::from(id);
            reservations.update_status(&id, status).await?;
            output::done(&format!("Event reservation {id} is now {status}"), global.quiet);
        }
    }
    Ok(())
}
