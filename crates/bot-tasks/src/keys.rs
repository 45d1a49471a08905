//! Blackboard keys shared between tasks.

use std::collections::BTreeSet;
use std::sync::Arc;

use bot_core::BbKey;
use bot_world::{Face, Position};

use crate::planner::TaskAction;
use crate::structure::{Palette, TargetGrid};

pub const STRUCTURE_START: BbKey<Position> = BbKey::new("Structure.start");
pub const STRUCTURE_END: BbKey<Position> = BbKey::new("Structure.end");
pub const STRUCTURE_TARGET: BbKey<Arc<TargetGrid>> = BbKey::new("Structure.target");
pub const STRUCTURE_PALETTE: BbKey<Arc<Palette>> = BbKey::new("Structure.palette");
pub const STRUCTURE_LOADED: BbKey<bool> = BbKey::new("Structure.loaded");

pub const INVENTORY_BLOCK_LIST: BbKey<BTreeSet<String>> = BbKey::new("Inventory.block_list");
pub const WORLD_CHESTS_POS: BbKey<Vec<Position>> = BbKey::new("World.ChestsPos");

pub const NEXT_TASK_ACTION: BbKey<TaskAction> = BbKey::new("NextTask.action");
pub const NEXT_TASK_POSITION: BbKey<Position> = BbKey::new("NextTask.block_position");
pub const NEXT_TASK_FACE: BbKey<Face> = BbKey::new("NextTask.face");
pub const NEXT_TASK_ITEM: BbKey<String> = BbKey::new("NextTask.item");

pub const CHECK_COMPLETION_FULL: BbKey<bool> = BbKey::new("CheckCompletion.full_check");
pub const CHECK_COMPLETION_DETAILS: BbKey<bool> = BbKey::new("CheckCompletion.print_details");
pub const CHECK_COMPLETION_ERRORS: BbKey<bool> = BbKey::new("CheckCompletion.print_errors");

pub const SAY_MSG: BbKey<String> = BbKey::new("Say.msg");
pub const INTERACT_POS: BbKey<Position> = BbKey::new("InteractWithBlock.pos");
pub const INTERACT_FACE: BbKey<Face> = BbKey::new("InteractWithBlock.face");
pub const CHECK_BOOL_KEY: BbKey<String> = BbKey::new("CheckBlackboardBoolData.key");
pub const SET_DATA_KEY: BbKey<String> = BbKey::new("SetBlackboardData.key");
pub const SET_DATA_VALUE: &str = "SetBlackboardData.data";
pub const REMOVE_DATA_KEY: BbKey<String> = BbKey::new("RemoveBlackboardData.key");
