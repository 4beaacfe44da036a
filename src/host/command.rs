//! Chat Commands
//!
//! `/tpa` and `/tpdeny` glue between the host's command dispatcher and the
//! request table. Validation and player lookup happen here; the table only
//! ever sees requests that are allowed to exist.

use thiserror::Error;
use tracing::debug;

use crate::core::slot::PlayerSlot;
use crate::game::table::{AcceptOutcome, RequestError, RequestTable};
use crate::host::registry::{Host, Session, PERMISSION_TP_OVERRIDE, PERMISSION_USE};

/// Send or accept a teleport request.
pub const CMD_TPA: &str = "tpa";

/// Deny the pending teleport request.
pub const CMD_TPDENY: &str = "tpdeny";

/// What a command did.
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    /// A request was sent to `target`.
    RequestSent {
        /// Slot of the player asked.
        target: PlayerSlot,
    },
    /// The caller's pending request was accepted.
    Accepted(AcceptOutcome),
    /// The caller's pending request was denied.
    Denied {
        /// Slot of the player turned down.
        requester: PlayerSlot,
    },
}

/// Command failures. `Display` is the text shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Caller lacks `tpa.use`.
    #[error("You do not have access to this command.")]
    PermissionDenied,

    /// Too many parameters.
    #[error("Invalid usage. Correct usage: '/tpa (player)'")]
    InvalidUsage,

    /// No player matched.
    #[error("Invalid player!")]
    PlayerNotFound,

    /// Several players matched.
    #[error("More than one match found -- unable to decide which is correct: {}", .0.join(", "))]
    MultipleMatches(Vec<String>),

    /// Target refuses teleports and the caller cannot override.
    #[error("{0} has disabled players from teleporting.")]
    TeleportDisabled(String),

    /// Caller has nothing to accept or deny.
    #[error("Nobody currently requests to teleport to you. '/tpa (player)' to send a request to another player.")]
    NoPendingRequest,

    /// Caller's own session could not be resolved.
    #[error("You are not connected.")]
    NotConnected,
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::NoPendingRequest(_) | RequestError::InvalidSlot(_) => {
                CommandError::NoPendingRequest
            }
            RequestError::TargetNotConnected(_) => CommandError::NotConnected,
        }
    }
}

/// Run a chat command for `caller`.
///
/// Returns `None` if `name` is not one of ours. Failures are reported to
/// the caller with `send_error` and also returned.
pub fn dispatch<H: Host + ?Sized>(
    table: &mut RequestTable,
    host: &mut H,
    caller: PlayerSlot,
    name: &str,
    args: &[&str],
) -> Option<Result<CommandOutcome, CommandError>> {
    let result = match name {
        CMD_TPA => tpa(table, host, caller, args),
        CMD_TPDENY => tpdeny(table, host, caller),
        _ => return None,
    };

    if let Err(ref err) = result {
        debug!("/{} from {} failed: {}", name, caller, err);
        if let Some(session) = host.resolve_session(caller) {
            host.send_error(&session, &err.to_string());
        }
    }

    Some(result)
}

/// `/tpa (player)` sends a request, bare `/tpa` accepts one.
pub fn tpa<H: Host + ?Sized>(
    table: &mut RequestTable,
    host: &mut H,
    caller: PlayerSlot,
    args: &[&str],
) -> Result<CommandOutcome, CommandError> {
    let session = caller_session(host, caller)?;

    match args {
        [] => {
            if table.check(caller).is_none() {
                return Err(CommandError::NoPendingRequest);
            }
            let outcome = table.accept_request(host, caller)?;
            Ok(CommandOutcome::Accepted(outcome))
        }
        [query] => {
            let target = find_target(host, query)?;

            if !target.tp_allow && !host.has_permission(caller, PERMISSION_TP_OVERRIDE) {
                return Err(CommandError::TeleportDisabled(target.name));
            }

            table.add_request(host, target.slot, caller, target.name.as_str(), session.name.as_str());

            let secs = table.config().request_duration_secs();
            host.send_success(
                &session,
                &format!(
                    "Sent teleport request to: {}. They have {} seconds to accept or deny.",
                    target.name, secs
                ),
            );

            Ok(CommandOutcome::RequestSent { target: target.slot })
        }
        _ => Err(CommandError::InvalidUsage),
    }
}

/// `/tpdeny` turns down the caller's pending request.
pub fn tpdeny<H: Host + ?Sized>(
    table: &mut RequestTable,
    host: &mut H,
    caller: PlayerSlot,
) -> Result<CommandOutcome, CommandError> {
    caller_session(host, caller)?;

    let denied = table.deny(host, caller)?;
    Ok(CommandOutcome::Denied {
        requester: denied.requester_slot,
    })
}

fn caller_session<H: Host + ?Sized>(host: &H, caller: PlayerSlot) -> Result<Session, CommandError> {
    let session = host.resolve_session(caller).ok_or(CommandError::NotConnected)?;
    if !host.has_permission(caller, PERMISSION_USE) {
        return Err(CommandError::PermissionDenied);
    }
    Ok(session)
}

fn find_target<H: Host + ?Sized>(host: &H, query: &str) -> Result<Session, CommandError> {
    let mut matches = host.find_players(query);
    match matches.len() {
        0 => Err(CommandError::PlayerNotFound),
        1 => Ok(matches.remove(0)),
        _ => Err(CommandError::MultipleMatches(
            matches.into_iter().map(|s| s.name).collect(),
        )),
    }
}
