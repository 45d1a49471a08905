//! Named leaves and the stock map-creation tree.

use bot_bt::{BehaviourTree, DecoratorKind, LeafRegistry, TreeError, TreeSpec};
use bot_core::Status;

use crate::base;
use crate::client::BehaviourClient;
use crate::inventory_tasks::{self, ItemFilter};
use crate::keys;
use crate::planner;
use crate::world_tasks;

/// Every leaf a tree description may name.
pub fn task_registry() -> LeafRegistry<BehaviourClient> {
    let mut registry = LeafRegistry::new();
    registry
        .register("yield", base::yield_once)
        .register("disconnect", base::disconnect)
        .register("say_blackboard", base::say_blackboard)
        .register("interact_with_block_blackboard", base::interact_with_block_blackboard)
        .register(
            "check_blackboard_bool_data_blackboard",
            base::check_blackboard_bool_data_blackboard,
        )
        .register(
            "set_blackboard_data_blackboard_bool",
            base::set_blackboard_data_blackboard::<bool>,
        )
        .register(
            "set_blackboard_data_blackboard_string",
            base::set_blackboard_data_blackboard::<String>,
        )
        .register(
            "remove_blackboard_data_blackboard",
            base::remove_blackboard_data_blackboard,
        )
        .register("get_all_chests_around", world_tasks::get_all_chests_around)
        .register(
            "get_blocks_available_in_inventory",
            inventory_tasks::get_blocks_available_in_inventory,
        )
        .register("refill_from_chests", |c: &mut BehaviourClient| {
            let filter = ItemFilter::Except(c.config().food_name.clone());
            inventory_tasks::swap_chests_inventory(c, &filter, true)
        })
        .register("store_in_chests", |c: &mut BehaviourClient| {
            let filter = ItemFilter::Except(c.config().food_name.clone());
            inventory_tasks::swap_chests_inventory(c, &filter, false)
        })
        .register("get_some_food", |c: &mut BehaviourClient| {
            let food = c.config().food_name.clone();
            inventory_tasks::get_some_food(c, &food)
        })
        .register("find_next_task", planner::find_next_task)
        .register("execute_next_task", planner::execute_next_task)
        .register("check_completion", planner::check_completion)
        .register("enable_completion_report", |c: &mut BehaviourClient| {
            let bb = c.blackboard_mut();
            keys::CHECK_COMPLETION_FULL.set(bb, true);
            keys::CHECK_COMPLETION_ERRORS.set(bb, true);
            Ok(Status::Success)
        })
        .register("announce_completion", |c: &mut BehaviourClient| {
            base::warn_console(c, "structure complete")
        });
    registry
}

/// Check for completion first; otherwise make sure there are blocks to use,
/// restocking from chests when empty, then plan and run one action.
pub fn map_creation_spec() -> TreeSpec {
    let leaf = TreeSpec::leaf;
    TreeSpec::Selector {
        name: Some("map_creation".into()),
        children: vec![
            TreeSpec::Sequence {
                name: Some("finished".into()),
                children: vec![
                    leaf("check_completion"),
                    leaf("enable_completion_report"),
                    leaf("check_completion"),
                    leaf("announce_completion"),
                    leaf("disconnect"),
                ],
            },
            TreeSpec::Sequence {
                name: Some("build".into()),
                children: vec![
                    TreeSpec::Selector {
                        name: Some("ensure_blocks".into()),
                        children: vec![
                            leaf("get_blocks_available_in_inventory"),
                            TreeSpec::Sequence {
                                name: Some("restock".into()),
                                children: vec![
                                    leaf("refill_from_chests"),
                                    leaf("get_blocks_available_in_inventory"),
                                ],
                            },
                        ],
                    },
                    leaf("find_next_task"),
                    TreeSpec::Decorator {
                        decorator: DecoratorKind::RetryUntilSuccess { attempts: 2 },
                        child: Box::new(leaf("execute_next_task")),
                    },
                ],
            },
        ],
    }
}

pub fn map_creation_tree() -> Result<BehaviourTree<BehaviourClient>, TreeError> {
    BehaviourTree::from_spec("map_creation", &map_creation_spec(), &task_registry())
}
