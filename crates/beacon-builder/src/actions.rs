//! Action builder — declared actions to resolved action buttons.

use beacon_assets::AssetResolver;
use beacon_core::types::{Action, InputCapture, PressTarget, ResolvedAction};
use futures::future::join_all;

use crate::text;

/// Key under which typed text for action `index` of `notification_id` is
/// handed back to the host.
pub fn input_result_key(notification_id: &str, index: usize) -> String {
    format!("beacon.input.{notification_id}.{index}")
}

/// Resolve `actions` in declared order.
///
/// Icons are fetched concurrently; a failed icon only drops that action's
/// icon. Output order always equals input order.
pub async fn build_actions(
    assets: &AssetResolver,
    actions: &[Action],
    notification_id: &str,
) -> Vec<ResolvedAction> {
    if actions.is_empty() {
        return Vec::new();
    }

    let icons = join_all(
        actions
            .iter()
            .map(|action| assets.resolve(action.icon.as_ref(), "action icon")),
    )
    .await;

    actions
        .iter()
        .zip(icons)
        .enumerate()
        .map(|(index, (action, icon))| ResolvedAction {
            title: text::render(&action.title),
            icon,
            target: PressTarget::action(notification_id, index, action.press_action.clone()),
            input: action.input.as_ref().map(|input| {
                InputCapture::from_remote_input(input_result_key(notification_id, index), input)
            }),
        })
        .collect()
}
