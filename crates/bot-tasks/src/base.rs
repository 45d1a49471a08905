//! Small general-purpose leaves.
//!
//! The `*_blackboard` variants read their parameters from well-known keys, so
//! a tree description can configure them without code. Missing mandatory keys
//! are contract violations.

use std::any::Any;

use bot_core::{Status, TaskResult};
use bot_world::{Face, Intent, Position};

use crate::client::BehaviourClient;
use crate::confirm::{settle, TaskFailure};
use crate::keys;

/// Idle for one quantum.
pub fn yield_once(c: &mut BehaviourClient) -> TaskResult {
    c.yield_now();
    Ok(Status::Success)
}

/// Ask the host to stop this agent and tell the server we are leaving.
pub fn disconnect(c: &mut BehaviourClient) -> TaskResult {
    tracing::info!(agent = %c.name(), "disconnecting");
    c.request_shutdown();
    if let Err(err) = c.send(Intent::Disconnect) {
        tracing::debug!(agent = %c.name(), %err, "disconnect intent not sent");
    }
    Ok(Status::Success)
}

pub fn say(c: &mut BehaviourClient, message: &str) -> TaskResult {
    let outcome = c
        .send(Intent::Chat {
            message: message.to_string(),
        })
        .map_err(TaskFailure::from);
    Ok(settle(c, "say", outcome))
}

pub fn say_blackboard(c: &mut BehaviourClient) -> TaskResult {
    let message = keys::SAY_MSG.get(c.blackboard())?.clone();
    say(c, &message)
}

/// Log a line tagged with the agent name.
pub fn warn_console(c: &mut BehaviourClient, message: &str) -> TaskResult {
    tracing::warn!(agent = %c.name(), "{message}");
    Ok(Status::Success)
}

/// Right-click a block. Fails when the block is not loaded.
pub fn interact_with_block(c: &mut BehaviourClient, position: Position, face: Face) -> TaskResult {
    let outcome = if c.world().read(|w| w.get_block(position)).is_none() {
        Err(TaskFailure::impossible(format!("block at {position} is not loaded")))
    } else {
        c.send(Intent::UseBlock { position, face })
            .map_err(TaskFailure::from)
    };
    Ok(settle(c, "interact with block", outcome))
}

pub fn interact_with_block_blackboard(c: &mut BehaviourClient) -> TaskResult {
    let position = *keys::INTERACT_POS.get(c.blackboard())?;
    let face = keys::INTERACT_FACE.get_or(c.blackboard(), Face::Top)?;
    interact_with_block(c, position, face)
}

/// Success when `key` holds `true`; a missing key counts as `false`.
pub fn check_blackboard_bool_data(c: &mut BehaviourClient, key: &str) -> TaskResult {
    Ok(Status::from(c.blackboard().get_or(key, false)?))
}

pub fn check_blackboard_bool_data_blackboard(c: &mut BehaviourClient) -> TaskResult {
    let key = keys::CHECK_BOOL_KEY.get(c.blackboard())?.clone();
    check_blackboard_bool_data(c, &key)
}

pub fn set_blackboard_data<T: Any + Send>(
    c: &mut BehaviourClient,
    key: &str,
    value: T,
) -> TaskResult {
    c.blackboard_mut().set(key, value);
    Ok(Status::Success)
}

/// Copy the value stored under `SetBlackboardData.data` to the key named by
/// `SetBlackboardData.key`.
pub fn set_blackboard_data_blackboard<T: Any + Send + Clone>(
    c: &mut BehaviourClient,
) -> TaskResult {
    let key = keys::SET_DATA_KEY.get(c.blackboard())?.clone();
    let value = c.blackboard().get::<T>(keys::SET_DATA_VALUE)?.clone();
    set_blackboard_data(c, &key, value)
}

pub fn remove_blackboard_data(c: &mut BehaviourClient, key: &str) -> TaskResult {
    c.blackboard_mut().remove(key);
    Ok(Status::Success)
}

pub fn remove_blackboard_data_blackboard(c: &mut BehaviourClient) -> TaskResult {
    let key = keys::REMOVE_DATA_KEY.get(c.blackboard())?.clone();
    remove_blackboard_data(c, &key)
}
