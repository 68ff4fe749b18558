//! Lock free control of a [`GrainScrubber`] from non real-time threads.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::{
    scrubber::{GrainScrubber, ScrubSnapshot},
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Number of commands which can be queued between two processed blocks.
const COMMAND_QUEUE_SIZE: usize = 128;
/// Number of snapshots which are kept until they get fetched.
const SNAPSHOT_QUEUE_SIZE: usize = 4;

// -------------------------------------------------------------------------------------------------

/// Commands sent from a [`ScrubController`] to a [`ScrubProcessor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubCommand {
    Start,
    Stop,
    SetSpeed(f32),
    SetReversed(bool),
    SetStartMs(f32),
    SetStartPos(f32),
    SetLengthMs(f32),
    SetLengthPos(f32),
    Inspect,
}

impl ScrubCommand {
    fn apply(self, scrubber: &mut GrainScrubber, snapshots: &ArrayQueue<ScrubSnapshot>) {
        match self {
            Self::Start => scrubber.start(),
            Self::Stop => scrubber.stop(),
            Self::SetSpeed(ratio) => scrubber.set_speed(ratio),
            Self::SetReversed(reversed) => scrubber.set_reversed(reversed),
            Self::SetStartMs(ms) => scrubber.set_start_ms(ms),
            Self::SetStartPos(pos) => scrubber.set_start_pos(pos),
            Self::SetLengthMs(ms) => scrubber.set_length_ms(ms),
            Self::SetLengthPos(pos) => scrubber.set_length_pos(pos),
            Self::Inspect => {
                // drop the oldest snapshot when nobody fetched them
                let _ = snapshots.force_push(scrubber.inspect());
            }
        }
    }
}

// -------------------------------------------------------------------------------------------------

impl GrainScrubber {
    /// Split the scrubber into a controller, which can be moved to and used in any thread,
    /// and a processor, which runs the scrubber in the real-time audio thread.
    pub fn split(self) -> (ScrubController, ScrubProcessor) {
        let command_queue = Arc::new(ArrayQueue::new(COMMAND_QUEUE_SIZE));
        let snapshot_queue = Arc::new(ArrayQueue::new(SNAPSHOT_QUEUE_SIZE));
        let controller = ScrubController {
            command_queue: Arc::clone(&command_queue),
            snapshot_queue: Arc::clone(&snapshot_queue),
        };
        let processor = ScrubProcessor {
            scrubber: self,
            command_queue,
            snapshot_queue,
        };
        (controller, processor)
    }
}

// -------------------------------------------------------------------------------------------------

/// Sends commands to a [`ScrubProcessor`] without blocking.
///
/// Commands are applied in the order they got sent, right before the processor renders its
/// next block. Parameter commands thus get staged with block accuracy and are committed by the
/// scrubber at the next grain boundary as usual.
#[derive(Clone)]
pub struct ScrubController {
    command_queue: Arc<ArrayQueue<ScrubCommand>>,
    snapshot_queue: Arc<ArrayQueue<ScrubSnapshot>>,
}

impl ScrubController {
    /// Queue a raw command.
    pub fn send(&self, command: ScrubCommand) -> Result<(), Error> {
        self.command_queue.push(command).map_err(|command| {
            log::warn!("Scrub command queue is full. Dropping command {command:?}");
            Error::SendError("Scrub command queue is full".to_string())
        })
    }

    pub fn start(&self) -> Result<(), Error> {
        log::debug!("Starting grain scrubber");
        self.send(ScrubCommand::Start)
    }

    pub fn stop(&self) -> Result<(), Error> {
        log::debug!("Stopping grain scrubber");
        self.send(ScrubCommand::Stop)
    }

    pub fn set_speed(&self, ratio: f32) -> Result<(), Error> {
        self.send(ScrubCommand::SetSpeed(ratio))
    }

    pub fn reverse(&self) -> Result<(), Error> {
        self.send(ScrubCommand::SetReversed(true))
    }

    pub fn forward(&self) -> Result<(), Error> {
        self.send(ScrubCommand::SetReversed(false))
    }

    pub fn set_start_ms(&self, ms: f32) -> Result<(), Error> {
        self.send(ScrubCommand::SetStartMs(ms))
    }

    pub fn set_start_pos(&self, pos: f32) -> Result<(), Error> {
        self.send(ScrubCommand::SetStartPos(pos))
    }

    pub fn set_length_ms(&self, ms: f32) -> Result<(), Error> {
        self.send(ScrubCommand::SetLengthMs(ms))
    }

    pub fn set_length_pos(&self, pos: f32) -> Result<(), Error> {
        self.send(ScrubCommand::SetLengthPos(pos))
    }

    /// Ask the processor to publish a snapshot of its state with the next block.
    pub fn request_inspect(&self) -> Result<(), Error> {
        self.send(ScrubCommand::Inspect)
    }

    /// Fetch the most recently published snapshot, if any, discarding older ones.
    pub fn latest_snapshot(&self) -> Option<ScrubSnapshot> {
        let mut latest = None;
        while let Some(snapshot) = self.snapshot_queue.pop() {
            latest = Some(snapshot);
        }
        latest
    }
}

// -------------------------------------------------------------------------------------------------

/// Runs a [`GrainScrubber`] in the audio thread and applies commands from its controllers.
pub struct ScrubProcessor {
    scrubber: GrainScrubber,
    command_queue: Arc<ArrayQueue<ScrubCommand>>,
    snapshot_queue: Arc<ArrayQueue<ScrubSnapshot>>,
}

impl ScrubProcessor {
    /// Access to the wrapped scrubber.
    pub fn scrubber(&self) -> &GrainScrubber {
        &self.scrubber
    }

    /// Apply all pending commands, then process the given block in place.
    pub fn process(&mut self, block: &mut [i16]) {
        Self::assert_no_alloc(|| {
            while let Some(command) = self.command_queue.pop() {
                command.apply(&mut self.scrubber, &self.snapshot_queue);
            }
            self.scrubber.update(block);
        })
    }

    /// Unwrap the scrubber. Commands which did not get processed yet are dropped.
    pub fn into_inner(self) -> GrainScrubber {
        self.scrubber
    }

    #[inline]
    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------
