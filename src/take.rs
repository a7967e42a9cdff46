//! Retrieval of a single pending sample.
//!
//! Every take runs the same sequence: check the handle's implementation tag,
//! resolve its sample source, pop one sample, and materialize it only if it is
//! alive. An empty source or a sample that is not alive is a successful call
//! that takes nothing.
//!
//! The free functions mirror the middleware C surface, where any argument may
//! be absent. They validate every argument before touching the sample source.

use crate::error::{Error, Result};
use crate::message_info::MessageInfo;
use crate::serialized::SerializedMessage;
use crate::subscription::Subscription;
use crate::IMPLEMENTATION_IDENTIFIER;
use tracing::{debug, error, trace, warn};

pub(crate) enum Destination<'a, T> {
    Typed(&'a mut T),
    Serialized(&'a mut SerializedMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TakeOutcome {
    Taken,
    Empty,
    NotAlive,
}

impl TakeOutcome {
    pub(crate) fn is_taken(self) -> bool {
        self == TakeOutcome::Taken
    }
}

pub(crate) fn take_sample<T>(
    subscription: &Subscription<T>,
    destination: Destination<'_, T>,
    message_info: Option<&mut MessageInfo>,
) -> Result<TakeOutcome> {
    if subscription.implementation_identifier() != IMPLEMENTATION_IDENTIFIER {
        error!(
            "Subscription handle from {} passed to {}",
            subscription.implementation_identifier(),
            IMPLEMENTATION_IDENTIFIER
        );
        return Err(Error::WrongImplementation {
            expected: IMPLEMENTATION_IDENTIFIER,
            found: subscription.implementation_identifier().to_string(),
        });
    }

    let source = subscription.resolve().map_err(|e| {
        warn!("{}", e);
        e
    })?;

    let Some(sample) = source.try_take_next() else {
        trace!("No pending sample on {}", subscription.topic().name());
        return Ok(TakeOutcome::Empty);
    };
    source.notify_consumed();

    if !sample.is_alive() {
        debug!(
            "Discarding {:?} sample {} from {}",
            sample.kind, sample.sequence_number, sample.writer_guid
        );
        return Ok(TakeOutcome::NotAlive);
    }

    match destination {
        Destination::Typed(message) => subscription
            .decoder()
            .decode(&sample.payload, message)
            .map_err(|e| {
                error!(
                    "Failed to decode sample {} on {}: {}",
                    sample.sequence_number,
                    subscription.topic().name(),
                    e
                );
                e
            })?,
        Destination::Serialized(serialized) => serialized.copy_from(&sample.payload)?,
    }

    if let Some(info) = message_info {
        info.assign(&sample);
    }

    trace!(
        "Took sample {} ({} bytes) from {}",
        sample.sequence_number,
        sample.payload.len(),
        sample.writer_guid
    );
    Ok(TakeOutcome::Taken)
}

fn required<A>(arg: Option<A>, name: &'static str) -> Result<A> {
    arg.ok_or(Error::InvalidArgument(name))
}

/// Take the next live sample as a typed message
pub fn take<T>(
    subscription: Option<&Subscription<T>>,
    message: Option<&mut T>,
    taken: Option<&mut bool>,
) -> Result<()> {
    let subscription = required(subscription, "subscription handle")?;
    let message = required(message, "message")?;
    let taken = required(taken, "taken flag")?;

    *taken = false;
    *taken = take_sample(subscription, Destination::Typed(message), None)?.is_taken();
    Ok(())
}

/// Take the next live sample as a typed message, with delivery metadata
pub fn take_with_info<T>(
    subscription: Option<&Subscription<T>>,
    message: Option<&mut T>,
    taken: Option<&mut bool>,
    message_info: Option<&mut MessageInfo>,
) -> Result<()> {
    let subscription = required(subscription, "subscription handle")?;
    let message = required(message, "message")?;
    let taken = required(taken, "taken flag")?;
    let message_info = required(message_info, "message info")?;

    *taken = false;
    *taken =
        take_sample(subscription, Destination::Typed(message), Some(message_info))?.is_taken();
    Ok(())
}

/// Take the next live sample as raw wire bytes
pub fn take_serialized<T>(
    subscription: Option<&Subscription<T>>,
    serialized: Option<&mut SerializedMessage>,
    taken: Option<&mut bool>,
) -> Result<()> {
    let subscription = required(subscription, "subscription handle")?;
    let serialized = required(serialized, "serialized message")?;
    let taken = required(taken, "taken flag")?;

    *taken = false;
    *taken = take_sample(subscription, Destination::Serialized(serialized), None)?.is_taken();
    Ok(())
}

/// Take the next live sample as raw wire bytes, with delivery metadata
pub fn take_serialized_with_info<T>(
    subscription: Option<&Subscription<T>>,
    serialized: Option<&mut SerializedMessage>,
    taken: Option<&mut bool>,
    message_info: Option<&mut MessageInfo>,
) -> Result<()> {
    let subscription = required(subscription, "subscription handle")?;
    let serialized = required(serialized, "serialized message")?;
    let taken = required(taken, "taken flag")?;
    let message_info = required(message_info, "message info")?;

    *taken = false;
    *taken = take_sample(
        subscription,
        Destination::Serialized(serialized),
        Some(message_info),
    )?
    .is_taken();
    Ok(())
}
