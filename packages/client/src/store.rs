use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error};

use crate::commands::GameApi;
use crate::errors::StoreClosed;
use crate::messages::Msg;
use crate::model::Model;
use crate::update::update;

/// Cloneable handle views use to send messages to a [`Store`].
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::UnboundedSender<Msg>,
}

impl Dispatcher {
    pub fn dispatch(&self, msg: Msg) -> Result<(), StoreClosed> {
        self.sender.send(msg).map_err(|_| StoreClosed)
    }
}

/// Sole owner of the [`Model`].
///
/// Messages are applied one at a time. Commands run as spawned tasks and
/// their follow-up messages are applied in completion order, not in the
/// order the commands were issued.
pub struct Store {
    model: Model,
    api: Arc<dyn GameApi>,
    inbox: mpsc::UnboundedReceiver<Msg>,
    inbox_closed: bool,
    commands: JoinSet<Option<Msg>>,
    publisher: watch::Sender<Model>,
}

impl Store {
    pub fn new(api: Arc<dyn GameApi>) -> (Self, Dispatcher) {
        let (sender, inbox) = mpsc::unbounded_channel();
        let (publisher, _) = watch::channel(Model::init());
        let store = Store {
            model: Model::init(),
            api,
            inbox,
            inbox_closed: false,
            commands: JoinSet::new(),
            publisher,
        };
        (store, Dispatcher { sender })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Receives every model the store applies.
    pub fn subscribe(&self) -> watch::Receiver<Model> {
        self.publisher.subscribe()
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Runs the reducer for `msg`, publishes the result, and spawns the
    /// command it asked for. Returns whether a command was spawned.
    pub fn apply(&mut self, msg: Msg) -> bool {
        debug!(message = msg.tag(), "Applying message");
        let (model, command) = update(std::mem::take(&mut self.model), msg);
        self.model = model;
        self.publisher.send_replace(self.model.clone());

        let Some(command) = command else {
            return false;
        };
        let api = self.api.clone();
        self.commands.spawn(async move {
            let tag = command.tag();
            match command.run(api.as_ref()).await {
                Ok(msg) => Some(msg),
                Err(err) => {
                    error!(command = tag, "Command failed: {}", err);
                    None
                }
            }
        });
        true
    }

    fn complete(&mut self, joined: Result<Option<Msg>, JoinError>) -> bool {
        match joined {
            Ok(Some(msg)) => {
                self.apply(msg);
                true
            }
            Ok(None) => false,
            Err(err) => {
                error!("Command task failed: {}", err);
                false
            }
        }
    }

    /// Applies the next message, either dispatched or produced by a finished
    /// command. Returns `false` once every dispatcher is gone and no command
    /// is left running.
    pub async fn process_next(&mut self) -> bool {
        loop {
            if self.inbox_closed && self.commands.is_empty() {
                return false;
            }
            let inbox_open = !self.inbox_closed;
            let running = !self.commands.is_empty();
            tokio::select! {
                msg = self.inbox.recv(), if inbox_open => match msg {
                    Some(msg) => {
                        self.apply(msg);
                        return true;
                    }
                    None => self.inbox_closed = true,
                },
                Some(joined) = self.commands.join_next(), if running => {
                    if self.complete(joined) {
                        return true;
                    }
                }
                else => return false,
            }
        }
    }

    /// Applies a dispatched message that is already queued, without waiting.
    pub fn try_process_next(&mut self) -> bool {
        match self.inbox.try_recv() {
            Ok(msg) => {
                self.apply(msg);
                true
            }
            Err(_) => false,
        }
    }

    /// Waits for every running command and applies what they produce,
    /// including anything spawned along the way.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.commands.join_next().await {
            self.complete(joined);
        }
    }

    pub async fn apply_and_settle(&mut self, msg: Msg) {
        self.apply(msg);
        self.settle().await;
    }

    /// Drives the store until the queue closes, returning the final model.
    pub async fn run(mut self) -> Model {
        while self.process_next().await {}
        self.model
    }
}
