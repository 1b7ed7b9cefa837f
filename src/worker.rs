//! Runs controller commands on the async runtime.
//!
//! Requests execute on tokio worker threads; their completions travel back
//! over a channel and are applied on the UI thread, which owns the map.

use crate::app::{App, Command, SearchTicket};
use crate::config::Config;
use crate::error::ServiceError;
use crate::geo::Coordinate;
use crate::geocode::Geocoder;
use crate::overpass::OverpassClient;
use crate::pipeline::FetchOutcome;
use crate::transport::Transport;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;

/// The two remote services behind one transport
pub struct Services<T> {
    pub overpass: OverpassClient<T>,
    pub geocoder: Geocoder<T>,
}

impl<T: Transport + Clone> Services<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            overpass: OverpassClient::new(transport.clone(), config.overpass_url.clone()),
            geocoder: Geocoder::new(transport, config.nominatim_url.clone()),
        }
    }
}

/// A finished network command
#[derive(Debug)]
pub enum Completion {
    Fetch(FetchOutcome),
    Geocode {
        ticket: SearchTicket,
        result: Result<Option<Coordinate>, ServiceError>,
    },
}

pub struct Dispatcher<T> {
    handle: Handle,
    services: Arc<Services<T>>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<T: Transport + 'static> Dispatcher<T> {
    pub fn new(handle: Handle, services: Arc<Services<T>>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            handle,
            services,
            tx,
            rx,
        }
    }

    /// Spawn a command; requests are never cancelled once started
    pub fn dispatch(&self, command: Command) {
        let services = Arc::clone(&self.services);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let completion = match command {
                Command::Fetch(req) => Completion::Fetch(FetchOutcome {
                    generation: req.generation,
                    result: services.overpass.fetch(req.query).await,
                }),
                Command::Geocode { ticket, text } => Completion::Geocode {
                    ticket,
                    result: services.geocoder.search(&text).await,
                },
            };
            // The receiver only goes away on shutdown
            let _ = tx.send(completion);
        });
    }

    /// Dispatch everything the app queued
    pub fn dispatch_all(&self, app: &mut App) {
        for command in app.take_commands() {
            self.dispatch(command);
        }
    }

    /// Apply every completion that has arrived; returns how many
    pub fn drain_into(&self, app: &mut App) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            match completion {
                Completion::Fetch(outcome) => app.complete_fetch(outcome),
                Completion::Geocode { ticket, result } => app.complete_search(ticket, result),
            }
            applied += 1;
        }
        applied
    }
}
