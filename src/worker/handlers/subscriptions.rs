//! Subscription handlers.
//!
//! Subscribing never validates that the target exists; existence is checked
//! lazily at each step and absent targets are skipped silently. Unsubscribing
//! an unknown id is a no-op.

use crate::protocol::{SubscribeParams, UnsubscribeParams};

use super::{SharedState, Subscription};

pub(crate) fn subscribe(state: &mut SharedState, params: SubscribeParams) {
    state.subscriptions.insert(
        params.id,
        Subscription { uuid: params.uuid, property: params.property, target: params.target },
    );
}

pub(crate) fn unsubscribe(state: &mut SharedState, params: UnsubscribeParams) {
    state.subscriptions.remove(&params.id);
}
