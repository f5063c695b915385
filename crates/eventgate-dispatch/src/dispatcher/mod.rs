//! Queue-event command dispatch.
//!
//! [`CommandDispatcher::execute`] is the single entry point. A call moves
//! through decoding, type resolution, the domain-event check, the
//! permission check, handler lookup and queuing, stopping at the first stage
//! that fails. Failures the caller can fix become a [`CommandResult`]; where
//! it helps, the result carries an example argument encoded with the
//! caller's output codec. Security faults from the store are never converted:
//! they surface as [`DispatchFault::Security`].
//!
//! ## Example argument
//!
//! ```json
//! {"name":"Module.Event","data":null}
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use eventgate_catalog::{CatalogError, TypeRegistry};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::argument::Argument;
use crate::cache::HandlerCache;
use crate::codec::{Codec, CodecError};
use crate::handler::{HandlerError, HandlerTable};
use crate::locator::ServiceLocator;
use crate::result::CommandResult;
use crate::security::{PermissionManager, Principal, SecurityFault};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Message attached to accepted results.
pub const EVENT_QUEUED: &str = "Event queued";

/// Failures that escape [`CommandDispatcher::execute`] instead of becoming a
/// [`CommandResult`].
#[derive(Debug, Error)]
pub enum DispatchFault {
    /// The event store raised a security violation.
    #[error(transparent)]
    Security(#[from] SecurityFault),

    /// The type catalog could not be built.
    #[error(transparent)]
    Scan(#[from] CatalogError),
}

/// Resolves named events and queues them on behalf of a principal.
pub struct CommandDispatcher {
    registry: Arc<TypeRegistry>,
    permissions: Arc<dyn PermissionManager>,
    handlers: HandlerCache,
}

impl fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("registry", &self.registry)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl CommandDispatcher {
    /// Creates a dispatcher over `registry`, checking access with
    /// `permissions` and building handlers from `handlers`.
    #[must_use]
    pub fn new(
        registry: Arc<TypeRegistry>,
        permissions: Arc<dyn PermissionManager>,
        handlers: HandlerTable,
    ) -> Self {
        Self {
            registry,
            permissions,
            handlers: HandlerCache::new(handlers),
        }
    }

    /// Creates a dispatcher over the process-wide registry, if one was
    /// installed.
    #[must_use]
    pub fn with_global_registry(
        permissions: Arc<dyn PermissionManager>,
        handlers: HandlerTable,
    ) -> Option<Self> {
        TypeRegistry::global().map(|registry| Self::new(registry, permissions, handlers))
    }

    /// Decodes `raw` into an [`Argument`] and queues the event it names.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchFault::Security`] when the event store reports a
    /// security violation and [`DispatchFault::Scan`] when the type catalog
    /// cannot be built. Every other failure is reported through the returned
    /// [`CommandResult`].
    pub fn execute<I, O>(
        &self,
        locator: &dyn ServiceLocator,
        input: &dyn Codec<I>,
        output: &dyn Codec<O>,
        principal: &Principal,
        raw: &I,
    ) -> Result<CommandResult<O>, DispatchFault> {
        let argument = match decode_argument(locator, input, raw) {
            Ok(argument) => argument,
            Err(decode_error) => {
                debug!(target: DISPATCH_TARGET, error = %decode_error, "rejecting undecodable input");
                return Ok(with_example(
                    CommandResult::fail(decode_error.to_string()),
                    output,
                    None,
                ));
            }
        };
        let name = argument.name.as_str();

        let Some(descriptor) = self.registry.find(name)? else {
            debug!(target: DISPATCH_TARGET, event = name, "unknown event type");
            return Ok(with_example(
                CommandResult::fail(format!("Couldn't find event type {name}.")),
                output,
                None,
            ));
        };

        if !descriptor.is_domain_event() {
            debug!(target: DISPATCH_TARGET, event = name, "type is not a domain event");
            return Ok(CommandResult::fail(format!(
                "Specified type ({name}) is not a domain event. Please check your arguments."
            )));
        }

        if !self
            .permissions
            .can_access(descriptor.qualified_name(), principal)
        {
            warn!(
                target: DISPATCH_TARGET,
                event = name,
                principal = principal.name(),
                "access denied"
            );
            return Ok(CommandResult::forbidden(format!(
                "You don't have permission to access: {name}."
            )));
        }

        let queued = self
            .handlers
            .get_or_create(&descriptor)
            .and_then(|handler| handler.queue(argument.data.as_ref(), locator));
        match queued {
            Ok(()) => {
                debug!(target: DISPATCH_TARGET, event = name, "event queued");
                Ok(CommandResult::accepted(EVENT_QUEUED))
            }
            Err(handler_error) => recover(handler_error, name, input, output),
        }
    }
}

fn decode_argument<I>(
    locator: &dyn ServiceLocator,
    input: &dyn Codec<I>,
    raw: &I,
) -> Result<Argument, CodecError> {
    let tree = input.decode(raw, locator)?;
    serde_json::from_value(tree).map_err(CodecError::from_json_error)
}

/// Converts a handler failure into a result, or lets a security fault
/// escape.
fn recover<I, O>(
    handler_error: HandlerError,
    name: &str,
    input: &dyn Codec<I>,
    output: &dyn Codec<O>,
) -> Result<CommandResult<O>, DispatchFault> {
    match handler_error {
        HandlerError::Security(fault) => {
            warn!(target: DISPATCH_TARGET, event = name, error = %fault, "store raised a security fault");
            Err(DispatchFault::Security(fault))
        }
        HandlerError::Locator(locator_error) => {
            error!(target: DISPATCH_TARGET, event = name, error = %locator_error, "event store unavailable");
            Ok(CommandResult::internal_error(locator_error.to_string()))
        }
        HandlerError::Serialization(_) => {
            error!(target: DISPATCH_TARGET, event = name, error = %handler_error, "event could not be serialized");
            Ok(CommandResult::internal_error(handler_error.to_string())
                .with_details(explain(&handler_error)))
        }
        HandlerError::Unregistered { .. } => {
            warn!(target: DISPATCH_TARGET, event = name, "no handler registered");
            Ok(CommandResult::fail(handler_error.to_string()))
        }
        HandlerError::Deserialization(_) => {
            debug!(target: DISPATCH_TARGET, event = name, error = %handler_error, "payload rejected");
            Ok(with_example(
                CommandResult::fail(handler_error.to_string()),
                output,
                Some(explain(&handler_error)),
            ))
        }
        HandlerError::Store {
            message,
            sent,
            source,
        } => {
            error!(target: DISPATCH_TARGET, event = name, error = %message, "store failed to queue event");
            let framework = sent.map_or_else(
                || format!("Error while queuing event: {message}. Data not sent."),
                |payload| {
                    format!(
                        "Error while queuing event: {message}. Sent data: \n{}",
                        render(input, &payload)
                    )
                },
            );
            let explanation = std::iter::once(framework)
                .chain(causes(&source).map(|cause| format!("caused by: {cause}")))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(with_example(
                CommandResult::fail(message),
                output,
                Some(explanation),
            ))
        }
    }
}

/// Attaches the example argument as payload and appends it to the details.
fn with_example<O>(
    mut result: CommandResult<O>,
    output: &dyn Codec<O>,
    explanation: Option<String>,
) -> CommandResult<O> {
    result.details = explanation;
    let encoded = match output.encode(&Argument::example().to_value()) {
        Ok(encoded) => encoded,
        Err(encode_error) => {
            warn!(target: DISPATCH_TARGET, error = %encode_error, "could not encode example argument");
            return result;
        }
    };
    let mut details = result
        .details
        .take()
        .map(|text| text + "\n")
        .unwrap_or_default();
    details.push_str("Example argument: \n");
    details.push_str(&output.describe(&encoded));
    result.with_details(details).with_payload(encoded)
}

/// Renders an event through the input codec, falling back to plain JSON.
fn render<I>(input: &dyn Codec<I>, payload: &Value) -> String {
    input
        .encode(payload)
        .map_or_else(|_| payload.to_string(), |encoded| input.describe(&encoded))
}

/// Formats an error and its source chain, one cause per line.
fn explain(error: &(dyn StdError + 'static)) -> String {
    std::iter::once(error.to_string())
        .chain(causes(error).map(|cause| format!("caused by: {cause}")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn causes<'a>(
    error: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(error.source(), |&cause| cause.source())
}
